//! Structural checks: entity name uniqueness and per-entity shape rules.

use std::collections::HashSet;

use crate::model::{Manifest, Transport};

use super::types::{Diagnostic, DiagnosticLevel};

pub fn validate(manifest: &Manifest) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    check_names(
        "server",
        "E002",
        manifest.servers.iter().map(|s| s.name.as_str()),
        &mut diags,
    );
    check_names(
        "agent",
        "E003",
        manifest.agents.iter().map(|a| a.name.as_str()),
        &mut diags,
    );
    check_names(
        "chain",
        "E004",
        manifest.chains.iter().map(|c| c.name.as_str()),
        &mut diags,
    );
    check_names(
        "router",
        "E005",
        manifest.routers.iter().map(|r| r.name.as_str()),
        &mut diags,
    );
    check_names(
        "orchestrator",
        "E006",
        manifest.orchestrators.iter().map(|o| o.name.as_str()),
        &mut diags,
    );
    check_names(
        "secret",
        "E007",
        manifest.secrets.iter().map(|s| s.name.as_str()),
        &mut diags,
    );

    for chain in &manifest.chains {
        if chain.sequence.is_empty() {
            diags.push(error(
                "E009",
                format!("chain '{}' has an empty sequence", chain.name),
                Some(chain.name.clone()),
                Some("sequence".to_string()),
            ));
        }
    }
    for router in &manifest.routers {
        if router.agents.is_empty() {
            diags.push(error(
                "E010",
                format!("router '{}' has no agents", router.name),
                Some(router.name.clone()),
                Some("agents".to_string()),
            ));
        }
    }
    for orchestrator in &manifest.orchestrators {
        if orchestrator.agents.is_empty() {
            diags.push(error(
                "E011",
                format!("orchestrator '{}' has no agents", orchestrator.name),
                Some(orchestrator.name.clone()),
                Some("agents".to_string()),
            ));
        }
    }

    for server in &manifest.servers {
        match server.transport {
            Transport::Stdio if server.command.is_empty() => {
                diags.push(error(
                    "E012",
                    format!("stdio server '{}' has no launch command", server.name),
                    Some(server.name.clone()),
                    Some("command".to_string()),
                ));
            }
            Transport::Sse | Transport::Http if server.url.is_none() => {
                diags.push(error(
                    "E013",
                    format!(
                        "{} server '{}' has no url",
                        server.transport, server.name
                    ),
                    Some(server.name.clone()),
                    Some("url".to_string()),
                ));
            }
            _ => {}
        }
    }

    diags
}

/// Flag empty and duplicated names for one entity kind.
fn check_names<'a>(
    kind: &str,
    duplicate_code: &str,
    names: impl Iterator<Item = &'a str>,
    diags: &mut Vec<Diagnostic>,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            diags.push(error(
                "E008",
                format!("{kind} name is empty"),
                None,
                Some("name".to_string()),
            ));
            continue;
        }
        if !seen.insert(name) && reported.insert(name) {
            diags.push(error(
                duplicate_code,
                format!("duplicate {kind} name: {name}"),
                Some(name.to_string()),
                None,
            ));
        }
    }
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
