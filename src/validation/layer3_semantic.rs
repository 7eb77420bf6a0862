//! Semantic checks: numeric ranges and default-workflow resolution.

use crate::model::Manifest;

use super::types::{Diagnostic, DiagnosticLevel};

pub fn validate(manifest: &Manifest) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    for chain in &manifest.chains {
        if chain.max_iterations < 1 {
            diags.push(error(
                "E201",
                format!(
                    "chain '{}' max_iterations must be positive, got {}",
                    chain.name, chain.max_iterations
                ),
                Some(chain.name.clone()),
                Some("max_iterations".to_string()),
            ));
        }
    }
    for orchestrator in &manifest.orchestrators {
        if orchestrator.plan_iterations < 1 {
            diags.push(error(
                "E202",
                format!(
                    "orchestrator '{}' plan_iterations must be positive, got {}",
                    orchestrator.name, orchestrator.plan_iterations
                ),
                Some(orchestrator.name.clone()),
                Some("plan_iterations".to_string()),
            ));
        }
    }

    let marked = manifest.marked_defaults();
    if marked.len() > 1 {
        let names: Vec<String> = marked
            .iter()
            .map(|(kind, name)| format!("{kind} '{name}'"))
            .collect();
        diags.push(error(
            "E203",
            format!("multiple entities marked as default: {}", names.join(", ")),
            None,
            Some("default".to_string()),
        ));
    } else if marked.is_empty() && manifest.workflow_count() > 1 {
        diags.push(error(
            "E204",
            format!(
                "no default workflow marked and {} workflow entities declared; mark one with DEFAULT",
                manifest.workflow_count()
            ),
            None,
            Some("default".to_string()),
        ));
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
