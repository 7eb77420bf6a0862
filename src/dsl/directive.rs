//! The uniform directive record both front-ends produce.

use serde::{Deserialize, Serialize};

/// Identifies one manifest directive. One variant per accepted keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    From,
    Framework,
    Model,
    Secret,
    Env,
    Run,
    Workdir,
    Copy,
    Expose,
    Entrypoint,
    Server,
    Command,
    Args,
    Transport,
    Url,
    Agent,
    Instruction,
    Servers,
    UseHistory,
    Chain,
    Sequence,
    Cumulative,
    MaxIterations,
    Router,
    Agents,
    Orchestrator,
    PlanType,
    PlanIterations,
    HumanInput,
    Default,
    Cmd,
}

impl DirectiveKind {
    /// Map a directive keyword (case-insensitive) to its kind.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "FROM" => Some(Self::From),
            "FRAMEWORK" => Some(Self::Framework),
            "MODEL" => Some(Self::Model),
            "SECRET" => Some(Self::Secret),
            "ENV" => Some(Self::Env),
            "RUN" => Some(Self::Run),
            "WORKDIR" => Some(Self::Workdir),
            "COPY" => Some(Self::Copy),
            "EXPOSE" => Some(Self::Expose),
            "ENTRYPOINT" => Some(Self::Entrypoint),
            "MCP_SERVER" | "SERVER" => Some(Self::Server),
            "COMMAND" => Some(Self::Command),
            "ARGS" => Some(Self::Args),
            "TRANSPORT" => Some(Self::Transport),
            "URL" => Some(Self::Url),
            "AGENT" => Some(Self::Agent),
            "INSTRUCTION" => Some(Self::Instruction),
            "SERVERS" => Some(Self::Servers),
            "USE_HISTORY" => Some(Self::UseHistory),
            "CHAIN" => Some(Self::Chain),
            "SEQUENCE" => Some(Self::Sequence),
            "CUMULATIVE" => Some(Self::Cumulative),
            "MAX_ITERATIONS" => Some(Self::MaxIterations),
            "ROUTER" => Some(Self::Router),
            "AGENTS" => Some(Self::Agents),
            "ORCHESTRATOR" => Some(Self::Orchestrator),
            "PLAN_TYPE" => Some(Self::PlanType),
            "PLAN_ITERATIONS" => Some(Self::PlanIterations),
            "HUMAN_INPUT" => Some(Self::HumanInput),
            "DEFAULT" => Some(Self::Default),
            "CMD" => Some(Self::Cmd),
            _ => None,
        }
    }

    /// True for directives that open an entity block.
    pub fn opens_block(self) -> bool {
        matches!(
            self,
            Self::Server | Self::Agent | Self::Chain | Self::Router | Self::Orchestrator
        )
    }

    /// True when the directive's entire remainder is one free-text argument.
    pub fn takes_free_text(self) -> bool {
        matches!(self, Self::Instruction)
    }
}

/// A single parsed directive: the shared intermediate representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub args: Vec<String>,
    /// Entity name, set only for block-opening directives.
    pub block_name: Option<String>,
}

impl Directive {
    /// An attribute or build-step directive.
    pub fn new(kind: DirectiveKind, args: Vec<String>) -> Self {
        Self {
            kind,
            args,
            block_name: None,
        }
    }

    /// A block-opening directive carrying the entity name.
    pub fn opener(kind: DirectiveKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            args: Vec::new(),
            block_name: Some(name.into()),
        }
    }
}
