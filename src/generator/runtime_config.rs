//! Runtime-configuration generator.
//!
//! Serializes tool servers, agents and workflow entities into the YAML
//! document the execution framework reads at start-up. The resolved default
//! workflow is marked with an explicit `default: true` flag.

use serde_yaml::{Mapping, Value};

use crate::model::{Manifest, WorkflowKind};

/// Model identifier used when neither the manifest nor the context set one.
const FALLBACK_MODEL: &str = "haiku";

pub(crate) fn generate(manifest: &Manifest) -> String {
    let default = manifest.default_workflow();
    let is_default =
        |kind: WorkflowKind, name: &str| default.map_or(false, |(k, n)| k == kind && n == name);

    let mut root = Mapping::new();
    root.insert(
        key("default_model"),
        str_value(manifest.default_model.as_deref().unwrap_or(FALLBACK_MODEL)),
    );
    root.insert(key("logger"), logger_section());

    if !manifest.servers.is_empty() {
        let mut servers = Mapping::new();
        for server in &manifest.servers {
            let mut entry = Mapping::new();
            entry.insert(key("transport"), str_value(&server.transport.to_string()));
            if !server.command.is_empty() {
                entry.insert(key("command"), str_value(&server.command));
            }
            if !server.args.is_empty() {
                entry.insert(key("args"), string_seq(&server.args));
            }
            if let Some(url) = &server.url {
                entry.insert(key("url"), str_value(url));
            }
            if !server.env.is_empty() {
                let mut env = Mapping::new();
                for (k, v) in &server.env {
                    env.insert(key(k), str_value(v));
                }
                entry.insert(key("env"), Value::Mapping(env));
            }
            servers.insert(key(&server.name), Value::Mapping(entry));
        }
        let mut mcp = Mapping::new();
        mcp.insert(key("servers"), Value::Mapping(servers));
        root.insert(key("mcp"), Value::Mapping(mcp));
    }

    if !manifest.agents.is_empty() {
        let mut agents = Vec::new();
        for agent in &manifest.agents {
            let mut entry = Mapping::new();
            entry.insert(key("name"), str_value(&agent.name));
            entry.insert(key("instruction"), str_value(&agent.instruction));
            if !agent.servers.is_empty() {
                entry.insert(key("servers"), string_seq(&agent.servers));
            }
            if let Some(model) = &agent.model {
                entry.insert(key("model"), str_value(model));
            }
            entry.insert(key("use_history"), Value::Bool(agent.use_history));
            if agent.human_input {
                entry.insert(key("human_input"), Value::Bool(true));
            }
            if is_default(WorkflowKind::Agent, &agent.name) {
                entry.insert(key("default"), Value::Bool(true));
            }
            agents.push(Value::Mapping(entry));
        }
        root.insert(key("agents"), Value::Sequence(agents));
    }

    if !manifest.chains.is_empty() {
        let mut chains = Vec::new();
        for chain in &manifest.chains {
            let mut entry = Mapping::new();
            entry.insert(key("name"), str_value(&chain.name));
            entry.insert(key("sequence"), string_seq(&chain.sequence));
            entry.insert(key("cumulative"), Value::Bool(chain.cumulative));
            entry.insert(
                key("max_iterations"),
                Value::Number(chain.max_iterations.into()),
            );
            if is_default(WorkflowKind::Chain, &chain.name) {
                entry.insert(key("default"), Value::Bool(true));
            }
            chains.push(Value::Mapping(entry));
        }
        root.insert(key("chains"), Value::Sequence(chains));
    }

    if !manifest.routers.is_empty() {
        let mut routers = Vec::new();
        for router in &manifest.routers {
            let mut entry = Mapping::new();
            entry.insert(key("name"), str_value(&router.name));
            entry.insert(key("agents"), string_seq(&router.agents));
            if let Some(instruction) = &router.instruction {
                entry.insert(key("instruction"), str_value(instruction));
            }
            if let Some(model) = &router.model {
                entry.insert(key("model"), str_value(model));
            }
            if is_default(WorkflowKind::Router, &router.name) {
                entry.insert(key("default"), Value::Bool(true));
            }
            routers.push(Value::Mapping(entry));
        }
        root.insert(key("routers"), Value::Sequence(routers));
    }

    if !manifest.orchestrators.is_empty() {
        let mut orchestrators = Vec::new();
        for orchestrator in &manifest.orchestrators {
            let mut entry = Mapping::new();
            entry.insert(key("name"), str_value(&orchestrator.name));
            entry.insert(key("agents"), string_seq(&orchestrator.agents));
            entry.insert(
                key("plan_type"),
                str_value(&orchestrator.plan_type.to_string()),
            );
            entry.insert(
                key("plan_iterations"),
                Value::Number(orchestrator.plan_iterations.into()),
            );
            if orchestrator.human_input {
                entry.insert(key("human_input"), Value::Bool(true));
            }
            if is_default(WorkflowKind::Orchestrator, &orchestrator.name) {
                entry.insert(key("default"), Value::Bool(true));
            }
            orchestrators.push(Value::Mapping(entry));
        }
        root.insert(key("orchestrators"), Value::Sequence(orchestrators));
    }

    if !manifest.secrets.is_empty() {
        let mut secrets = Mapping::new();
        for secret in &manifest.secrets {
            let value = match &secret.value {
                Some(literal) => literal.clone(),
                None => format!("${{{}}}", secret.name),
            };
            secrets.insert(key(&secret.name), str_value(&value));
        }
        root.insert(key("secrets"), Value::Mapping(secrets));
    }

    serde_yaml::to_string(&Value::Mapping(root)).unwrap_or_default()
}

fn logger_section() -> Value {
    let mut logger = Mapping::new();
    logger.insert(key("level"), str_value("info"));
    logger.insert(key("progress_display"), Value::Bool(true));
    logger.insert(key("show_chat"), Value::Bool(true));
    logger.insert(key("show_tools"), Value::Bool(true));
    logger.insert(key("truncate_tools"), Value::Bool(true));
    Value::Mapping(logger)
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn str_value(value: &str) -> Value {
    Value::String(value.to_string())
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| str_value(s)).collect())
}
