//! Render a canonical manifest back to either accepted syntax.
//!
//! Fields at their defaults are omitted, so rendering a just-built model and
//! re-parsing it reproduces an equal model in both directions.

use serde_yaml::{Mapping, Value};

use crate::model::types::{
    DEFAULT_BASE_IMAGE, DEFAULT_CHAIN_ITERATIONS, DEFAULT_CMD, DEFAULT_FRAMEWORK,
    DEFAULT_INSTRUCTION, DEFAULT_PLAN_ITERATIONS,
};
use crate::model::{Manifest, PlanType, Transport};

/// Render the manifest in the line-oriented directive syntax.
pub fn render_dsl(manifest: &Manifest) -> String {
    let mut lines = vec![format!("FROM {}", manifest.base_image)];
    if manifest.framework != DEFAULT_FRAMEWORK {
        lines.push(format!("FRAMEWORK {}", manifest.framework));
    }
    if let Some(model) = &manifest.default_model {
        lines.push(format!("MODEL {model}"));
    }
    lines.push(String::new());

    for secret in &manifest.secrets {
        match &secret.value {
            Some(value) => lines.push(format!("SECRET {}={}", secret.name, value)),
            None => lines.push(format!("SECRET {}", secret.name)),
        }
    }
    if !manifest.secrets.is_empty() {
        lines.push(String::new());
    }

    for server in &manifest.servers {
        lines.push(format!("MCP_SERVER {}", server.name));
        if !server.command.is_empty() {
            lines.push(format!("COMMAND {}", server.command));
        }
        if !server.args.is_empty() {
            lines.push(format!("ARGS {}", server.args.join(" ")));
        }
        if server.transport != Transport::Stdio {
            lines.push(format!("TRANSPORT {}", server.transport));
        }
        if let Some(url) = &server.url {
            lines.push(format!("URL {url}"));
        }
        for (k, v) in &server.env {
            lines.push(format!("ENV {k}={v}"));
        }
        lines.push(String::new());
    }

    for agent in &manifest.agents {
        lines.push(format!("AGENT {}", agent.name));
        if agent.instruction != DEFAULT_INSTRUCTION {
            lines.push(format!("INSTRUCTION {}", single_line(&agent.instruction)));
        }
        if !agent.servers.is_empty() {
            lines.push(format!("SERVERS {}", agent.servers.join(" ")));
        }
        if let Some(model) = &agent.model {
            lines.push(format!("MODEL {model}"));
        }
        if !agent.use_history {
            lines.push("USE_HISTORY false".to_string());
        }
        if agent.human_input {
            lines.push("HUMAN_INPUT true".to_string());
        }
        if agent.default {
            lines.push("DEFAULT true".to_string());
        }
        lines.push(String::new());
    }

    for chain in &manifest.chains {
        lines.push(format!("CHAIN {}", chain.name));
        if !chain.sequence.is_empty() {
            lines.push(format!("SEQUENCE {}", chain.sequence.join(" ")));
        }
        if chain.cumulative {
            lines.push("CUMULATIVE true".to_string());
        }
        if chain.max_iterations != DEFAULT_CHAIN_ITERATIONS {
            lines.push(format!("MAX_ITERATIONS {}", chain.max_iterations));
        }
        if chain.default {
            lines.push("DEFAULT true".to_string());
        }
        lines.push(String::new());
    }

    for router in &manifest.routers {
        lines.push(format!("ROUTER {}", router.name));
        if !router.agents.is_empty() {
            lines.push(format!("AGENTS {}", router.agents.join(" ")));
        }
        if let Some(instruction) = &router.instruction {
            lines.push(format!("INSTRUCTION {}", single_line(instruction)));
        }
        if let Some(model) = &router.model {
            lines.push(format!("MODEL {model}"));
        }
        if router.default {
            lines.push("DEFAULT true".to_string());
        }
        lines.push(String::new());
    }

    for orchestrator in &manifest.orchestrators {
        lines.push(format!("ORCHESTRATOR {}", orchestrator.name));
        if !orchestrator.agents.is_empty() {
            lines.push(format!("AGENTS {}", orchestrator.agents.join(" ")));
        }
        if orchestrator.plan_type != PlanType::Full {
            lines.push(format!("PLAN_TYPE {}", orchestrator.plan_type));
        }
        if orchestrator.plan_iterations != DEFAULT_PLAN_ITERATIONS {
            lines.push(format!("PLAN_ITERATIONS {}", orchestrator.plan_iterations));
        }
        if orchestrator.human_input {
            lines.push("HUMAN_INPUT true".to_string());
        }
        if orchestrator.default {
            lines.push("DEFAULT true".to_string());
        }
        lines.push(String::new());
    }

    for step in &manifest.build_steps {
        lines.push(step.to_line());
    }
    for port in &manifest.expose_ports {
        lines.push(format!("EXPOSE {port}"));
    }
    if !manifest.entrypoint.is_empty() {
        lines.push(format!(
            "ENTRYPOINT {}",
            serde_json::to_string(&manifest.entrypoint).unwrap_or_default()
        ));
    }
    if manifest.cmd != DEFAULT_CMD {
        lines.push(format!(
            "CMD {}",
            serde_json::to_string(&manifest.cmd).unwrap_or_default()
        ));
    }

    // Collapse the trailing blank separator.
    while lines.last().map_or(false, |l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n") + "\n"
}

/// Render the manifest in the structured YAML syntax.
pub fn render_structured(manifest: &Manifest) -> String {
    let mut root = Mapping::new();
    root.insert(key("apiVersion"), str_value("v1"));
    root.insert(key("kind"), str_value("Agent"));

    let mut base = Mapping::new();
    if manifest.base_image != DEFAULT_BASE_IMAGE {
        base.insert(key("image"), str_value(&manifest.base_image));
    }
    if let Some(model) = &manifest.default_model {
        base.insert(key("model"), str_value(model));
    }
    if manifest.framework != DEFAULT_FRAMEWORK {
        base.insert(key("framework"), str_value(&manifest.framework));
    }
    if !base.is_empty() {
        root.insert(key("base"), Value::Mapping(base));
    }

    if !manifest.servers.is_empty() {
        let mut servers = Vec::new();
        for server in &manifest.servers {
            let mut entry = Mapping::new();
            entry.insert(key("name"), str_value(&server.name));
            if !server.command.is_empty() {
                entry.insert(key("command"), str_value(&server.command));
            }
            if !server.args.is_empty() {
                entry.insert(key("args"), string_seq(&server.args));
            }
            if server.transport != Transport::Stdio {
                entry.insert(key("transport"), str_value(&server.transport.to_string()));
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
            servers.push(Value::Mapping(entry));
        }
        root.insert(key("mcp_servers"), Value::Sequence(servers));
    }

    if !manifest.agents.is_empty() {
        let mut agents = Vec::new();
        for agent in &manifest.agents {
            let mut entry = Mapping::new();
            entry.insert(key("name"), str_value(&agent.name));
            if agent.instruction != DEFAULT_INSTRUCTION {
                entry.insert(key("instruction"), str_value(&agent.instruction));
            }
            if !agent.servers.is_empty() {
                entry.insert(key("servers"), string_seq(&agent.servers));
            }
            if let Some(model) = &agent.model {
                entry.insert(key("model"), str_value(model));
            }
            if !agent.use_history {
                entry.insert(key("use_history"), Value::Bool(false));
            }
            if agent.human_input {
                entry.insert(key("human_input"), Value::Bool(true));
            }
            if agent.default {
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
            if !chain.sequence.is_empty() {
                entry.insert(key("sequence"), string_seq(&chain.sequence));
            }
            if chain.cumulative {
                entry.insert(key("cumulative"), Value::Bool(true));
            }
            if chain.max_iterations != DEFAULT_CHAIN_ITERATIONS {
                entry.insert(
                    key("max_iterations"),
                    Value::Number(chain.max_iterations.into()),
                );
            }
            if chain.default {
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
            if !router.agents.is_empty() {
                entry.insert(key("agents"), string_seq(&router.agents));
            }
            if let Some(instruction) = &router.instruction {
                entry.insert(key("instruction"), str_value(instruction));
            }
            if let Some(model) = &router.model {
                entry.insert(key("model"), str_value(model));
            }
            if router.default {
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
            if !orchestrator.agents.is_empty() {
                entry.insert(key("agents"), string_seq(&orchestrator.agents));
            }
            if orchestrator.plan_type != PlanType::Full {
                entry.insert(
                    key("plan_type"),
                    str_value(&orchestrator.plan_type.to_string()),
                );
            }
            if orchestrator.plan_iterations != DEFAULT_PLAN_ITERATIONS {
                entry.insert(
                    key("plan_iterations"),
                    Value::Number(orchestrator.plan_iterations.into()),
                );
            }
            if orchestrator.human_input {
                entry.insert(key("human_input"), Value::Bool(true));
            }
            if orchestrator.default {
                entry.insert(key("default"), Value::Bool(true));
            }
            orchestrators.push(Value::Mapping(entry));
        }
        root.insert(key("orchestrators"), Value::Sequence(orchestrators));
    }

    if !manifest.secrets.is_empty() {
        let mut secrets = Vec::new();
        for secret in &manifest.secrets {
            match &secret.value {
                Some(value) => {
                    let mut entry = Mapping::new();
                    entry.insert(key("name"), str_value(&secret.name));
                    entry.insert(key("value"), str_value(value));
                    secrets.push(Value::Mapping(entry));
                }
                None => secrets.push(str_value(&secret.name)),
            }
        }
        root.insert(key("secrets"), Value::Sequence(secrets));
    }

    if !manifest.expose_ports.is_empty() {
        let ports = manifest
            .expose_ports
            .iter()
            .map(|p| Value::Number((*p as i64).into()))
            .collect();
        root.insert(key("expose"), Value::Sequence(ports));
    }
    if manifest.cmd != DEFAULT_CMD {
        root.insert(key("command"), string_seq(&manifest.cmd));
    }

    let mut steps = Vec::new();
    for step in &manifest.build_steps {
        steps.push(step_entry(&step.instruction, &step.args));
    }
    if !manifest.entrypoint.is_empty() {
        steps.push(step_entry("ENTRYPOINT", &manifest.entrypoint));
    }
    if !steps.is_empty() {
        root.insert(key("dockerfile"), Value::Sequence(steps));
    }

    serde_yaml::to_string(&Value::Mapping(root)).unwrap_or_default()
}

fn step_entry(instruction: &str, args: &[String]) -> Value {
    let mut entry = Mapping::new();
    entry.insert(key("instruction"), str_value(instruction));
    entry.insert(key("args"), string_seq(args));
    Value::Mapping(entry)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{parse_manifest, ManifestFormat};
    use crate::model::{build_manifest, Agent, Chain, CompileContext, Secret, ToolServer};

    fn sample() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.default_model = Some("haiku".to_string());
        let mut server = ToolServer::new("fetch");
        server.command = "uvx".to_string();
        server.args = vec!["mcp-server-fetch".to_string()];
        server.env.insert("TIMEOUT".to_string(), "30".to_string());
        manifest.servers.push(server);
        let mut agent = Agent::new("a");
        agent.instruction = "do X".to_string();
        agent.servers = vec!["fetch".to_string()];
        manifest.agents.push(agent);
        let mut chain = Chain::new("loop");
        chain.sequence = vec!["a".to_string(), "a".to_string()];
        chain.cumulative = true;
        manifest.chains.push(chain);
        manifest.secrets.push(Secret {
            name: "OPENAI_API_KEY".to_string(),
            value: None,
        });
        manifest
    }

    #[test]
    fn test_dsl_round_trip() {
        let manifest = sample();
        let text = render_dsl(&manifest);
        let directives = parse_manifest(&text, ManifestFormat::Directives).unwrap();
        let rebuilt = build_manifest(directives, &CompileContext::default()).unwrap();
        assert_eq!(rebuilt, manifest);
    }

    #[test]
    fn test_structured_round_trip() {
        let manifest = sample();
        let text = render_structured(&manifest);
        let directives = parse_manifest(&text, ManifestFormat::Yaml).unwrap();
        let rebuilt = build_manifest(directives, &CompileContext::default()).unwrap();
        assert_eq!(rebuilt, manifest);
    }

    #[test]
    fn test_renders_omit_defaults() {
        let text = render_dsl(&Manifest::default());
        assert!(!text.contains("CMD"));
        assert!(!text.contains("USE_HISTORY"));

        let text = render_structured(&Manifest::default());
        assert!(!text.contains("base:"));
        assert!(!text.contains("command:"));
    }
}
