//! Reference checks: every name used as a reference must resolve to a
//! declared entity of the expected kind. Exact name equality only.

use std::collections::HashSet;

use crate::model::Manifest;

use super::types::{Diagnostic, DiagnosticLevel};

pub fn validate(manifest: &Manifest) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    let server_names: HashSet<&str> = manifest.servers.iter().map(|s| s.name.as_str()).collect();
    let agent_names: HashSet<&str> = manifest.agents.iter().map(|a| a.name.as_str()).collect();

    for agent in &manifest.agents {
        for server in &agent.servers {
            if !server_names.contains(server.as_str()) {
                diags.push(error(
                    "E101",
                    format!(
                        "agent '{}' references undefined server '{}'",
                        agent.name, server
                    ),
                    Some(agent.name.clone()),
                    Some("servers".to_string()),
                ));
            }
        }
    }

    for chain in &manifest.chains {
        for name in &chain.sequence {
            if !agent_names.contains(name.as_str()) {
                diags.push(error(
                    "E102",
                    format!("chain '{}' references undefined agent '{}'", chain.name, name),
                    Some(chain.name.clone()),
                    Some("sequence".to_string()),
                ));
            }
        }
    }

    for router in &manifest.routers {
        for name in &router.agents {
            if !agent_names.contains(name.as_str()) {
                diags.push(error(
                    "E103",
                    format!(
                        "router '{}' references undefined agent '{}'",
                        router.name, name
                    ),
                    Some(router.name.clone()),
                    Some("agents".to_string()),
                ));
            }
        }
    }

    for orchestrator in &manifest.orchestrators {
        for name in &orchestrator.agents {
            if !agent_names.contains(name.as_str()) {
                diags.push(error(
                    "E104",
                    format!(
                        "orchestrator '{}' references undefined agent '{}'",
                        orchestrator.name, name
                    ),
                    Some(orchestrator.name.clone()),
                    Some("agents".to_string()),
                ));
            }
        }
    }

    if manifest.workflow_count() > 0 {
        let referenced: HashSet<&str> = manifest
            .chains
            .iter()
            .flat_map(|c| c.sequence.iter())
            .chain(manifest.routers.iter().flat_map(|r| r.agents.iter()))
            .chain(manifest.orchestrators.iter().flat_map(|o| o.agents.iter()))
            .map(String::as_str)
            .collect();
        for agent in &manifest.agents {
            if !referenced.contains(agent.name.as_str()) && !agent.default {
                diags.push(Diagnostic {
                    level: DiagnosticLevel::Warning,
                    code: "W101".to_string(),
                    message: format!(
                        "agent '{}' is not used by any chain, router or orchestrator",
                        agent.name
                    ),
                    entity: Some(agent.name.clone()),
                    field: None,
                });
            }
        }
    }

    diags
}

fn error(
    code: &str,
    message: String,
    entity: Option<String>,
    field: Option<String>,
) -> Diagnostic {
    Diagnostic {
        level: DiagnosticLevel::Error,
        code: code.to_string(),
        message,
        entity,
        field,
    }
}
