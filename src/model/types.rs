//! Canonical manifest entities: the model both front-ends converge on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Base image used when the manifest does not name one.
pub const DEFAULT_BASE_IMAGE: &str = "python:3.12-slim";

/// Execution framework targeted by the generators.
pub const DEFAULT_FRAMEWORK: &str = "fast-agent";

/// Instruction used when an agent does not set one.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful agent.";

/// Entry command used when the manifest does not set one.
pub const DEFAULT_CMD: &[&str] = &["python", "agent.py"];

/// Default bound for evaluator-optimizer style chain loops.
pub const DEFAULT_CHAIN_ITERATIONS: i64 = 3;

/// Default bound for orchestrator planning rounds.
pub const DEFAULT_PLAN_ITERATIONS: i64 = 5;

/// How a tool server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Stdio,
    Sse,
    Http,
}

impl Transport {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stdio" => Some(Self::Stdio),
            "sse" => Some(Self::Sse),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::Http => "http",
        };
        write!(f, "{s}")
    }
}

/// Orchestrator planning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Full,
    Iterative,
}

impl PlanType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "iterative" => Some(Self::Iterative),
            _ => None,
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Full => "full",
            Self::Iterative => "iterative",
        };
        write!(f, "{s}")
    }
}

/// An external tool server an agent can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServer {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub transport: Transport,
    pub url: Option<String>,
}

impl ToolServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: String::new(),
            args: Vec::new(),
            env: BTreeMap::new(),
            transport: Transport::Stdio,
            url: None,
        }
    }
}

/// A single agent definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub name: String,
    pub instruction: String,
    pub servers: Vec<String>,
    pub model: Option<String>,
    pub use_history: bool,
    pub human_input: bool,
    pub default: bool,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            servers: Vec::new(),
            model: None,
            use_history: true,
            human_input: false,
            default: false,
        }
    }
}

/// An ordered, possibly repeating sequence of agents.
///
/// A repeated agent with `cumulative` set models an evaluator-optimizer
/// loop bounded by `max_iterations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    pub sequence: Vec<String>,
    pub cumulative: bool,
    pub max_iterations: i64,
    pub default: bool,
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sequence: Vec::new(),
            cumulative: false,
            max_iterations: DEFAULT_CHAIN_ITERATIONS,
            default: false,
        }
    }
}

/// Dispatches each request to exactly one agent from a candidate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    pub name: String,
    pub agents: Vec<String>,
    pub instruction: Option<String>,
    pub model: Option<String>,
    pub default: bool,
}

impl Router {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: Vec::new(),
            instruction: None,
            model: None,
            default: false,
        }
    }
}

/// Plans and coordinates a set of agents toward a composite goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orchestrator {
    pub name: String,
    pub agents: Vec<String>,
    pub plan_type: PlanType,
    pub plan_iterations: i64,
    pub human_input: bool,
    pub default: bool,
}

impl Orchestrator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agents: Vec::new(),
            plan_type: PlanType::Full,
            plan_iterations: DEFAULT_PLAN_ITERATIONS,
            human_input: false,
            default: false,
        }
    }
}

/// A secret either carries an inline literal or is supplied by the
/// execution environment at run time, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub value: Option<String>,
}

/// One raw build-file instruction, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStep {
    pub instruction: String,
    pub args: Vec<String>,
}

impl BuildStep {
    pub fn new(instruction: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            instruction: instruction.into(),
            args,
        }
    }

    /// Render as a build-file line. CMD/ENTRYPOINT always use array form.
    pub fn to_line(&self) -> String {
        match self.instruction.as_str() {
            "CMD" | "ENTRYPOINT" => format!(
                "{} {}",
                self.instruction,
                serde_json::to_string(&self.args).unwrap_or_default()
            ),
            _ => format!("{} {}", self.instruction, self.args.join(" ")),
        }
    }
}

/// The kind of entity a default-workflow resolution names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowKind {
    Agent,
    Chain,
    Router,
    Orchestrator,
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Agent => "agent",
            Self::Chain => "chain",
            Self::Router => "router",
            Self::Orchestrator => "orchestrator",
        };
        write!(f, "{s}")
    }
}

/// The canonical manifest model, immutable once validation succeeds.
///
/// Entity vectors preserve declaration order; lookups resolve the last
/// declaration of a name so that diagnostics and rendering agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub base_image: String,
    pub default_model: Option<String>,
    pub framework: String,
    pub build_steps: Vec<BuildStep>,
    pub servers: Vec<ToolServer>,
    pub agents: Vec<Agent>,
    pub chains: Vec<Chain>,
    pub routers: Vec<Router>,
    pub orchestrators: Vec<Orchestrator>,
    pub secrets: Vec<Secret>,
    pub expose_ports: Vec<u16>,
    pub entrypoint: Vec<String>,
    pub cmd: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            default_model: None,
            framework: DEFAULT_FRAMEWORK.to_string(),
            build_steps: Vec::new(),
            servers: Vec::new(),
            agents: Vec::new(),
            chains: Vec::new(),
            routers: Vec::new(),
            orchestrators: Vec::new(),
            secrets: Vec::new(),
            expose_ports: Vec::new(),
            entrypoint: Vec::new(),
            cmd: DEFAULT_CMD.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Manifest {
    pub fn server(&self, name: &str) -> Option<&ToolServer> {
        self.servers.iter().rev().find(|s| s.name == name)
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().rev().find(|a| a.name == name)
    }

    /// Number of chain/router/orchestrator entities.
    pub fn workflow_count(&self) -> usize {
        self.chains.len() + self.routers.len() + self.orchestrators.len()
    }

    /// Entities explicitly marked as default, in declaration order.
    pub fn marked_defaults(&self) -> Vec<(WorkflowKind, &str)> {
        let mut marked = Vec::new();
        for agent in self.agents.iter().filter(|a| a.default) {
            marked.push((WorkflowKind::Agent, agent.name.as_str()));
        }
        for chain in self.chains.iter().filter(|c| c.default) {
            marked.push((WorkflowKind::Chain, chain.name.as_str()));
        }
        for router in self.routers.iter().filter(|r| r.default) {
            marked.push((WorkflowKind::Router, router.name.as_str()));
        }
        for orchestrator in self.orchestrators.iter().filter(|o| o.default) {
            marked.push((WorkflowKind::Orchestrator, orchestrator.name.as_str()));
        }
        marked
    }

    /// Resolve the single default workflow, when one is determinable.
    ///
    /// An explicit mark wins; otherwise a sole workflow entity, or a sole
    /// agent when no workflow entities exist. Ambiguity returns `None` and
    /// is rejected by the validator.
    pub fn default_workflow(&self) -> Option<(WorkflowKind, &str)> {
        let marked = self.marked_defaults();
        if marked.len() == 1 {
            return marked.into_iter().next();
        }
        if !marked.is_empty() {
            return None;
        }
        match self.workflow_count() {
            1 => {
                if let [chain] = self.chains.as_slice() {
                    return Some((WorkflowKind::Chain, chain.name.as_str()));
                }
                if let [router] = self.routers.as_slice() {
                    return Some((WorkflowKind::Router, router.name.as_str()));
                }
                if let [orchestrator] = self.orchestrators.as_slice() {
                    return Some((WorkflowKind::Orchestrator, orchestrator.name.as_str()));
                }
                None
            }
            0 => match self.agents.as_slice() {
                [agent] => Some((WorkflowKind::Agent, agent.name.as_str())),
                _ => None,
            },
            _ => None,
        }
    }
}
