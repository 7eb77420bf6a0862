//! Serde schema of the structured manifest syntax.
//!
//! Fields are kept permissive (`Option` / `#[serde(default)]`) so that
//! decoding failures surface only where a value is genuinely malformed;
//! semantic checks happen in the model builder and validator.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Accepted `apiVersion` values.
pub const SUPPORTED_API_VERSIONS: &[&str] = &["v1"];

/// Accepted `kind` values.
pub const SUPPORTED_KINDS: &[&str] = &["Agent"];

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSchema {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub base: BaseSchema,
    #[serde(default)]
    pub mcp_servers: Vec<ServerSchema>,
    #[serde(default)]
    pub agents: Vec<AgentSchema>,
    #[serde(default)]
    pub chains: Vec<ChainSchema>,
    #[serde(default)]
    pub routers: Vec<RouterSchema>,
    #[serde(default)]
    pub orchestrators: Vec<OrchestratorSchema>,
    #[serde(default)]
    pub secrets: Vec<SecretSchema>,
    #[serde(default)]
    pub expose: Vec<u16>,
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default)]
    pub dockerfile: Vec<StepSchema>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Agent".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseSchema {
    pub image: Option<String>,
    pub model: Option<String>,
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSchema {
    pub name: String,
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub transport: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSchema {
    pub name: String,
    pub instruction: Option<String>,
    #[serde(default)]
    pub servers: Vec<String>,
    pub model: Option<String>,
    pub use_history: Option<bool>,
    pub human_input: Option<bool>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSchema {
    pub name: String,
    #[serde(default)]
    pub sequence: Vec<String>,
    pub cumulative: Option<bool>,
    pub max_iterations: Option<i64>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterSchema {
    pub name: String,
    #[serde(default)]
    pub agents: Vec<String>,
    pub instruction: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSchema {
    pub name: String,
    #[serde(default)]
    pub agents: Vec<String>,
    pub plan_type: Option<String>,
    pub plan_iterations: Option<i64>,
    pub human_input: Option<bool>,
    #[serde(default)]
    pub default: bool,
}

/// A secret is either a bare environment name or an inline value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SecretSchema {
    Name(String),
    Value { name: String, value: String },
}

/// A raw build-file instruction carried through verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct StepSchema {
    pub instruction: String,
    #[serde(default)]
    pub args: Vec<String>,
}
