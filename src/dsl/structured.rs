//! Structured front-end: decodes the YAML manifest syntax and lowers it to
//! the same directive records the line-oriented syntax produces.

use super::directive::{Directive, DirectiveKind};
use super::schema::{
    ManifestSchema, SecretSchema, StepSchema, SUPPORTED_API_VERSIONS, SUPPORTED_KINDS,
};
use crate::error::ManifestError;

/// Decode structured manifest content into directive records.
pub fn parse_structured(content: &str) -> Result<Vec<Directive>, ManifestError> {
    let schema: ManifestSchema =
        serde_yaml::from_str(content).map_err(|e| ManifestError::Structured {
            path: error_path(&e),
            message: e.to_string(),
        })?;
    lower_schema(schema)
}

/// Best-effort source position for a decode error.
fn error_path(err: &serde_yaml::Error) -> String {
    match err.location() {
        Some(loc) => format!("line {}, column {}", loc.line(), loc.column()),
        None => "<document>".to_string(),
    }
}

fn lower_schema(schema: ManifestSchema) -> Result<Vec<Directive>, ManifestError> {
    if !SUPPORTED_API_VERSIONS.contains(&schema.api_version.as_str()) {
        return Err(structured_error(
            "apiVersion",
            format!(
                "unsupported apiVersion: {} (supported: {})",
                schema.api_version,
                SUPPORTED_API_VERSIONS.join(", ")
            ),
        ));
    }
    if !SUPPORTED_KINDS.contains(&schema.kind.as_str()) {
        return Err(structured_error(
            "kind",
            format!(
                "unsupported kind: {} (supported: {})",
                schema.kind,
                SUPPORTED_KINDS.join(", ")
            ),
        ));
    }

    let mut out = Vec::new();

    if let Some(image) = schema.base.image {
        out.push(Directive::new(DirectiveKind::From, vec![image]));
    }
    if let Some(model) = schema.base.model {
        out.push(Directive::new(DirectiveKind::Model, vec![model]));
    }
    if let Some(framework) = schema.base.framework {
        out.push(Directive::new(DirectiveKind::Framework, vec![framework]));
    }

    for secret in schema.secrets {
        let args = match secret {
            SecretSchema::Name(name) => vec![name],
            SecretSchema::Value { name, value } => vec![name, value],
        };
        out.push(Directive::new(DirectiveKind::Secret, args));
    }

    for server in schema.mcp_servers {
        out.push(Directive::opener(DirectiveKind::Server, server.name));
        if let Some(command) = server.command {
            out.push(Directive::new(DirectiveKind::Command, vec![command]));
        }
        if !server.args.is_empty() {
            out.push(Directive::new(DirectiveKind::Args, server.args));
        }
        if let Some(transport) = server.transport {
            out.push(Directive::new(DirectiveKind::Transport, vec![transport]));
        }
        if let Some(url) = server.url {
            out.push(Directive::new(DirectiveKind::Url, vec![url]));
        }
        for (key, value) in server.env {
            out.push(Directive::new(DirectiveKind::Env, vec![key, value]));
        }
    }

    for agent in schema.agents {
        out.push(Directive::opener(DirectiveKind::Agent, agent.name));
        if let Some(instruction) = agent.instruction {
            out.push(Directive::new(DirectiveKind::Instruction, vec![instruction]));
        }
        if !agent.servers.is_empty() {
            out.push(Directive::new(DirectiveKind::Servers, agent.servers));
        }
        if let Some(model) = agent.model {
            out.push(Directive::new(DirectiveKind::Model, vec![model]));
        }
        if let Some(use_history) = agent.use_history {
            out.push(bool_directive(DirectiveKind::UseHistory, use_history));
        }
        if let Some(human_input) = agent.human_input {
            out.push(bool_directive(DirectiveKind::HumanInput, human_input));
        }
        if agent.default {
            out.push(bool_directive(DirectiveKind::Default, true));
        }
    }

    for chain in schema.chains {
        out.push(Directive::opener(DirectiveKind::Chain, chain.name));
        if !chain.sequence.is_empty() {
            out.push(Directive::new(DirectiveKind::Sequence, chain.sequence));
        }
        if let Some(cumulative) = chain.cumulative {
            out.push(bool_directive(DirectiveKind::Cumulative, cumulative));
        }
        if let Some(max_iterations) = chain.max_iterations {
            out.push(Directive::new(
                DirectiveKind::MaxIterations,
                vec![max_iterations.to_string()],
            ));
        }
        if chain.default {
            out.push(bool_directive(DirectiveKind::Default, true));
        }
    }

    for router in schema.routers {
        out.push(Directive::opener(DirectiveKind::Router, router.name));
        if !router.agents.is_empty() {
            out.push(Directive::new(DirectiveKind::Agents, router.agents));
        }
        if let Some(instruction) = router.instruction {
            out.push(Directive::new(DirectiveKind::Instruction, vec![instruction]));
        }
        if let Some(model) = router.model {
            out.push(Directive::new(DirectiveKind::Model, vec![model]));
        }
        if router.default {
            out.push(bool_directive(DirectiveKind::Default, true));
        }
    }

    for orchestrator in schema.orchestrators {
        out.push(Directive::opener(
            DirectiveKind::Orchestrator,
            orchestrator.name,
        ));
        if !orchestrator.agents.is_empty() {
            out.push(Directive::new(DirectiveKind::Agents, orchestrator.agents));
        }
        if let Some(plan_type) = orchestrator.plan_type {
            out.push(Directive::new(DirectiveKind::PlanType, vec![plan_type]));
        }
        if let Some(plan_iterations) = orchestrator.plan_iterations {
            out.push(Directive::new(
                DirectiveKind::PlanIterations,
                vec![plan_iterations.to_string()],
            ));
        }
        if let Some(human_input) = orchestrator.human_input {
            out.push(bool_directive(DirectiveKind::HumanInput, human_input));
        }
        if orchestrator.default {
            out.push(bool_directive(DirectiveKind::Default, true));
        }
    }

    for (index, step) in schema.dockerfile.into_iter().enumerate() {
        out.push(lower_step(step, index)?);
    }

    for port in schema.expose {
        out.push(Directive::new(DirectiveKind::Expose, vec![port.to_string()]));
    }
    if !schema.command.is_empty() {
        out.push(Directive::new(DirectiveKind::Cmd, schema.command));
    }

    Ok(out)
}

/// Lower one raw `dockerfile[]` step to its directive.
fn lower_step(step: StepSchema, index: usize) -> Result<Directive, ManifestError> {
    let path = || format!("dockerfile[{index}].instruction");
    let kind = match DirectiveKind::from_keyword(&step.instruction) {
        Some(
            kind @ (DirectiveKind::From
            | DirectiveKind::Env
            | DirectiveKind::Run
            | DirectiveKind::Workdir
            | DirectiveKind::Copy
            | DirectiveKind::Expose
            | DirectiveKind::Entrypoint
            | DirectiveKind::Cmd),
        ) => kind,
        _ => {
            return Err(structured_error(
                &path(),
                format!("unsupported build instruction: {}", step.instruction),
            ))
        }
    };

    let args = match kind {
        // RUN keeps its remainder as one verbatim argument.
        DirectiveKind::Run => vec![step.args.join(" ")],
        DirectiveKind::Env => match step.args.as_slice() {
            [assignment] => match assignment.split_once('=') {
                Some((key, value)) => vec![key.to_string(), value.to_string()],
                None => {
                    return Err(structured_error(
                        &format!("dockerfile[{index}].args"),
                        format!("ENV expects a KEY=VALUE assignment, got: {assignment}"),
                    ))
                }
            },
            [key, value] => vec![key.clone(), value.clone()],
            _ => {
                return Err(structured_error(
                    &format!("dockerfile[{index}].args"),
                    "ENV expects a KEY=VALUE assignment".to_string(),
                ))
            }
        },
        _ => step.args,
    };
    if args.is_empty() || args.iter().all(|a| a.is_empty()) {
        return Err(structured_error(
            &format!("dockerfile[{index}].args"),
            format!("{} requires arguments", step.instruction),
        ));
    }
    Ok(Directive::new(kind, args))
}

fn bool_directive(kind: DirectiveKind, value: bool) -> Directive {
    Directive::new(kind, vec![value.to_string()])
}

fn structured_error(path: &str, message: String) -> ManifestError {
    ManifestError::Structured {
        path: path.to_string(),
        message,
    }
}
