//! Folds the ordered directive sequence into a canonical [`Manifest`].
//!
//! The fold keeps one explicit "currently open block" state. Entity-opening
//! directives finalize the previous block and start a new accumulator;
//! attribute directives mutate the open accumulator and are rejected when no
//! compatible block is open. Build-step directives outside a server block
//! accumulate onto the image-level step list in order.

use super::types::{
    Agent, BuildStep, Chain, Manifest, Orchestrator, PlanType, Router, Secret, ToolServer,
    Transport,
};
use crate::dsl::{Directive, DirectiveKind};
use crate::error::ManifestError;

/// Process-wide compilation inputs supplied by the caller.
///
/// The default model is threaded explicitly rather than read from ambient
/// state; a manifest-level `MODEL` directive overrides it.
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    pub default_model: Option<String>,
}

/// The currently open entity block.
enum Block {
    None,
    Server(ToolServer),
    Agent(Agent),
    Chain(Chain),
    Router(Router),
    Orchestrator(Orchestrator),
}

impl Block {
    fn kind_name(&self) -> &'static str {
        match self {
            Block::None => "no open block",
            Block::Server(_) => "server block",
            Block::Agent(_) => "agent block",
            Block::Chain(_) => "chain block",
            Block::Router(_) => "router block",
            Block::Orchestrator(_) => "orchestrator block",
        }
    }
}

/// Build a manifest from directive records.
///
/// Entity redeclarations are kept side by side for the validator to flag;
/// nothing is silently merged or overwritten here.
pub fn build_manifest(
    directives: Vec<Directive>,
    ctx: &CompileContext,
) -> Result<Manifest, ManifestError> {
    let mut manifest = Manifest {
        default_model: ctx.default_model.clone(),
        ..Manifest::default()
    };
    let mut block = Block::None;

    for directive in directives {
        block = apply(&mut manifest, block, directive)?;
    }
    finalize(&mut manifest, block);

    Ok(manifest)
}

/// Close the open block, moving its accumulator onto the manifest.
fn finalize(manifest: &mut Manifest, block: Block) {
    match block {
        Block::None => {}
        Block::Server(server) => manifest.servers.push(server),
        Block::Agent(agent) => manifest.agents.push(agent),
        Block::Chain(chain) => manifest.chains.push(chain),
        Block::Router(router) => manifest.routers.push(router),
        Block::Orchestrator(orchestrator) => manifest.orchestrators.push(orchestrator),
    }
}

fn apply(
    manifest: &mut Manifest,
    mut block: Block,
    directive: Directive,
) -> Result<Block, ManifestError> {
    let Directive {
        kind,
        mut args,
        block_name,
    } = directive;

    if kind.opens_block() {
        finalize(manifest, block);
        let name = block_name.unwrap_or_default();
        return Ok(match kind {
            DirectiveKind::Server => Block::Server(ToolServer::new(name)),
            DirectiveKind::Agent => Block::Agent(Agent::new(name)),
            DirectiveKind::Chain => Block::Chain(Chain::new(name)),
            DirectiveKind::Router => Block::Router(Router::new(name)),
            DirectiveKind::Orchestrator => Block::Orchestrator(Orchestrator::new(name)),
            _ => unreachable!("opens_block covers exactly the entity keywords"),
        });
    }

    let first = args.first().cloned().unwrap_or_default();
    match kind {
        DirectiveKind::From => manifest.base_image = first,
        DirectiveKind::Framework => {
            if first != manifest.framework {
                return Err(build_error(format!(
                    "unsupported framework: {first} (supported: {})",
                    manifest.framework
                )));
            }
        }
        DirectiveKind::Model => match &mut block {
            Block::None => manifest.default_model = Some(first),
            Block::Agent(agent) => agent.model = Some(first),
            Block::Router(router) => router.model = Some(first),
            other => return Err(misplaced("MODEL", other)),
        },
        DirectiveKind::Secret => {
            let value = if args.len() > 1 { Some(args.remove(1)) } else { None };
            manifest.secrets.push(Secret { name: first, value });
        }
        DirectiveKind::Env => match &mut block {
            Block::Server(server) => {
                let value = args.get(1).cloned().unwrap_or_default();
                server.env.insert(first, value);
            }
            _ => {
                let value = args.get(1).cloned().unwrap_or_default();
                manifest
                    .build_steps
                    .push(BuildStep::new("ENV", vec![format!("{first}={value}")]));
            }
        },
        DirectiveKind::Run => manifest.build_steps.push(BuildStep::new("RUN", args)),
        DirectiveKind::Workdir => manifest.build_steps.push(BuildStep::new("WORKDIR", args)),
        DirectiveKind::Copy => manifest.build_steps.push(BuildStep::new("COPY", args)),
        DirectiveKind::Expose => {
            for arg in &args {
                let port = arg.parse::<u16>().map_err(|_| {
                    build_error(format!("EXPOSE expects a port number, got: {arg}"))
                })?;
                if !manifest.expose_ports.contains(&port) {
                    manifest.expose_ports.push(port);
                }
            }
        }
        DirectiveKind::Entrypoint => manifest.entrypoint = args,
        DirectiveKind::Cmd => manifest.cmd = args,
        DirectiveKind::Command => match &mut block {
            Block::Server(server) => server.command = first,
            other => return Err(misplaced("COMMAND", other)),
        },
        DirectiveKind::Args => match &mut block {
            Block::Server(server) => server.args = args,
            other => return Err(misplaced("ARGS", other)),
        },
        DirectiveKind::Transport => match &mut block {
            Block::Server(server) => {
                server.transport = Transport::parse(&first).ok_or_else(|| {
                    build_error(format!(
                        "invalid transport: {first} (expected stdio, sse or http)"
                    ))
                })?;
            }
            other => return Err(misplaced("TRANSPORT", other)),
        },
        DirectiveKind::Url => match &mut block {
            Block::Server(server) => server.url = Some(first),
            other => return Err(misplaced("URL", other)),
        },
        DirectiveKind::Instruction => match &mut block {
            Block::Agent(agent) => agent.instruction = first,
            Block::Router(router) => router.instruction = Some(first),
            other => return Err(misplaced("INSTRUCTION", other)),
        },
        DirectiveKind::Servers => match &mut block {
            Block::Agent(agent) => agent.servers = args,
            other => return Err(misplaced("SERVERS", other)),
        },
        DirectiveKind::UseHistory => match &mut block {
            Block::Agent(agent) => agent.use_history = parse_bool("USE_HISTORY", &first)?,
            other => return Err(misplaced("USE_HISTORY", other)),
        },
        DirectiveKind::Sequence => match &mut block {
            Block::Chain(chain) => chain.sequence = args,
            other => return Err(misplaced("SEQUENCE", other)),
        },
        DirectiveKind::Cumulative => match &mut block {
            Block::Chain(chain) => chain.cumulative = parse_bool("CUMULATIVE", &first)?,
            other => return Err(misplaced("CUMULATIVE", other)),
        },
        DirectiveKind::MaxIterations => match &mut block {
            Block::Chain(chain) => chain.max_iterations = parse_int("MAX_ITERATIONS", &first)?,
            other => return Err(misplaced("MAX_ITERATIONS", other)),
        },
        DirectiveKind::Agents => match &mut block {
            Block::Router(router) => router.agents = args,
            Block::Orchestrator(orchestrator) => orchestrator.agents = args,
            other => return Err(misplaced("AGENTS", other)),
        },
        DirectiveKind::PlanType => match &mut block {
            Block::Orchestrator(orchestrator) => {
                orchestrator.plan_type = PlanType::parse(&first).ok_or_else(|| {
                    build_error(format!(
                        "invalid plan type: {first} (expected full or iterative)"
                    ))
                })?;
            }
            other => return Err(misplaced("PLAN_TYPE", other)),
        },
        DirectiveKind::PlanIterations => match &mut block {
            Block::Orchestrator(orchestrator) => {
                orchestrator.plan_iterations = parse_int("PLAN_ITERATIONS", &first)?;
            }
            other => return Err(misplaced("PLAN_ITERATIONS", other)),
        },
        DirectiveKind::HumanInput => match &mut block {
            Block::Agent(agent) => agent.human_input = parse_bool("HUMAN_INPUT", &first)?,
            Block::Orchestrator(orchestrator) => {
                orchestrator.human_input = parse_bool("HUMAN_INPUT", &first)?;
            }
            other => return Err(misplaced("HUMAN_INPUT", other)),
        },
        DirectiveKind::Default => {
            let value = parse_bool("DEFAULT", &first)?;
            match &mut block {
                Block::Agent(agent) => agent.default = value,
                Block::Chain(chain) => chain.default = value,
                Block::Router(router) => router.default = value,
                Block::Orchestrator(orchestrator) => orchestrator.default = value,
                other => return Err(misplaced("DEFAULT", other)),
            }
        }
        DirectiveKind::Server
        | DirectiveKind::Agent
        | DirectiveKind::Chain
        | DirectiveKind::Router
        | DirectiveKind::Orchestrator => unreachable!("openers handled above"),
    }

    Ok(block)
}

fn parse_bool(keyword: &str, value: &str) -> Result<bool, ManifestError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(build_error(format!(
            "{keyword} expects true or false, got: {value}"
        ))),
    }
}

fn parse_int(keyword: &str, value: &str) -> Result<i64, ManifestError> {
    value
        .parse::<i64>()
        .map_err(|_| build_error(format!("{keyword} expects an integer, got: {value}")))
}

fn misplaced(keyword: &str, block: &Block) -> ManifestError {
    build_error(format!("{keyword} is not valid in {}", block.kind_name()))
}

fn build_error(message: String) -> ManifestError {
    ManifestError::BuildError(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{parse_manifest, ManifestFormat};

    fn build(text: &str) -> Result<Manifest, ManifestError> {
        let directives = parse_manifest(text, ManifestFormat::Directives)?;
        build_manifest(directives, &CompileContext::default())
    }

    #[test]
    fn test_build_minimal() {
        let m = build("FROM base:latest\nAGENT a\nINSTRUCTION do X\nCMD [\"run\"]\n").unwrap();
        assert_eq!(m.base_image, "base:latest");
        assert_eq!(m.agents.len(), 1);
        assert_eq!(m.agents[0].instruction, "do X");
        assert_eq!(m.cmd, vec!["run"]);
    }

    #[test]
    fn test_env_routes_to_server_or_image() {
        let m = build(
            "ENV PYTHONUNBUFFERED=1\nSERVER github\nCOMMAND npx\nENV GITHUB_TOKEN=abc\n",
        )
        .unwrap();
        assert_eq!(m.build_steps.len(), 1);
        assert_eq!(m.build_steps[0].args, vec!["PYTHONUNBUFFERED=1"]);
        assert_eq!(
            m.servers[0].env.get("GITHUB_TOKEN").map(String::as_str),
            Some("abc")
        );
    }

    #[test]
    fn test_model_dual_role() {
        let m = build("MODEL haiku\nAGENT a\nMODEL sonnet\n").unwrap();
        assert_eq!(m.default_model.as_deref(), Some("haiku"));
        assert_eq!(m.agents[0].model.as_deref(), Some("sonnet"));
    }

    #[test]
    fn test_context_default_model_overridden_by_manifest() {
        let directives =
            parse_manifest("AGENT a\n", ManifestFormat::Directives).unwrap();
        let ctx = CompileContext {
            default_model: Some("haiku".to_string()),
        };
        let m = build_manifest(directives, &ctx).unwrap();
        assert_eq!(m.default_model.as_deref(), Some("haiku"));

        let directives =
            parse_manifest("MODEL sonnet\nAGENT a\n", ManifestFormat::Directives).unwrap();
        let m = build_manifest(directives, &ctx).unwrap();
        assert_eq!(m.default_model.as_deref(), Some("sonnet"));
    }

    #[test]
    fn test_attribute_outside_block_rejected() {
        let err = build("INSTRUCTION do X\n").unwrap_err();
        assert!(err.to_string().contains("INSTRUCTION is not valid"));

        let err = build("SERVER s\nSEQUENCE a b\n").unwrap_err();
        assert!(err.to_string().contains("SEQUENCE is not valid in server block"));
    }

    #[test]
    fn test_server_block_attributes() {
        let m = build(
            "MCP_SERVER fetch\nCOMMAND uvx\nARGS mcp-server-fetch --verbose\nTRANSPORT sse\nURL http://localhost:8000/sse\n",
        )
        .unwrap();
        let server = &m.servers[0];
        assert_eq!(server.command, "uvx");
        assert_eq!(server.args, vec!["mcp-server-fetch", "--verbose"]);
        assert_eq!(server.transport, Transport::Sse);
        assert_eq!(server.url.as_deref(), Some("http://localhost:8000/sse"));
    }

    #[test]
    fn test_invalid_transport_rejected() {
        let err = build("SERVER s\nTRANSPORT grpc\n").unwrap_err();
        assert!(err.to_string().contains("invalid transport: grpc"));
    }

    #[test]
    fn test_invalid_numeric_rejected() {
        let err = build("CHAIN c\nSEQUENCE a\nMAX_ITERATIONS soon\n").unwrap_err();
        assert!(err.to_string().contains("expects an integer"));
    }

    #[test]
    fn test_non_positive_iterations_survive_build() {
        // Range checks belong to the validator, not the fold.
        let m = build("CHAIN c\nSEQUENCE a\nMAX_ITERATIONS 0\n").unwrap();
        assert_eq!(m.chains[0].max_iterations, 0);
    }

    #[test]
    fn test_redeclared_entity_kept_for_validator() {
        let m = build("AGENT a\nINSTRUCTION first\nAGENT a\nINSTRUCTION second\n").unwrap();
        assert_eq!(m.agents.len(), 2);
        assert_eq!(m.agent("a").map(|a| a.instruction.as_str()), Some("second"));
    }

    #[test]
    fn test_orchestrator_block() {
        let m = build(
            "ORCHESTRATOR boss\nAGENTS a b\nPLAN_TYPE iterative\nPLAN_ITERATIONS 7\nHUMAN_INPUT true\nDEFAULT\n",
        )
        .unwrap();
        let o = &m.orchestrators[0];
        assert_eq!(o.agents, vec!["a", "b"]);
        assert_eq!(o.plan_type, PlanType::Iterative);
        assert_eq!(o.plan_iterations, 7);
        assert!(o.human_input);
        assert!(o.default);
    }

    #[test]
    fn test_expose_dedup_and_bad_port() {
        let m = build("EXPOSE 8000 8000 9000\n").unwrap();
        assert_eq!(m.expose_ports, vec![8000, 9000]);

        let err = build("EXPOSE http\n").unwrap_err();
        assert!(err.to_string().contains("port number"));
    }

    #[test]
    fn test_unsupported_framework() {
        let err = build("FRAMEWORK agno\n").unwrap_err();
        assert!(err.to_string().contains("unsupported framework"));
        assert!(build("FRAMEWORK fast-agent\n").is_ok());
    }
}
