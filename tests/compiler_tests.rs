//! End-to-end compilation tests over both manifest syntaxes.

use agentforge::{CompileContext, ManifestCompiler, ManifestError, ManifestFormat};

fn compile(text: &str) -> Result<agentforge::CompiledManifest, ManifestError> {
    ManifestCompiler::compile(text, ManifestFormat::Directives, &CompileContext::default())
}

#[test]
fn test_minimal_manifest_end_to_end() {
    let text = "FROM base:latest\nAGENT a\nINSTRUCTION do X\nCMD [\"run\"]\n";
    let compiled = compile(text).unwrap();

    assert!(compiled.artifacts.dockerfile.contains("FROM base:latest"));
    assert!(compiled.artifacts.runtime_config.contains("name: a"));
    assert!(compiled.artifacts.runtime_config.contains("instruction: do X"));
    assert!(compiled.artifacts.dockerfile.contains("CMD [\"run\"]"));
    assert_eq!(compiled.manifest.cmd, vec!["run"]);
    assert!(compiled.report.is_valid);
    assert!(compiled.report.diagnostics.is_empty());
}

#[test]
fn test_dangling_router_reference_produces_no_artifacts() {
    let err = compile("ROUTER r\nAGENTS missing_agent\n").unwrap_err();
    let report = err.report().expect("validation report");
    assert!(!report.is_valid);
    let diag = report
        .diagnostics
        .iter()
        .find(|d| d.code == "E103")
        .expect("reference error");
    assert!(diag.message.contains("missing_agent"));
    assert_eq!(diag.entity.as_deref(), Some("r"));
}

#[test]
fn test_artifacts_are_deterministic() {
    let text = "\
FROM base:latest
MODEL haiku
SECRET OPENAI_API_KEY
MCP_SERVER fetch
COMMAND uvx
ARGS mcp-server-fetch
AGENT a
INSTRUCTION do X
SERVERS fetch
EXPOSE 8000
";
    let first = compile(text).unwrap();
    let second = compile(text).unwrap();
    assert_eq!(first.artifacts, second.artifacts);
}

#[test]
fn test_build_step_ordering_preserved() {
    let text = "ENV A=1\nRUN x\nENV A=2\nAGENT a\n";
    let compiled = compile(text).unwrap();
    let dockerfile = &compiled.artifacts.dockerfile;
    let a1 = dockerfile.find("ENV A=1").expect("first ENV");
    let run = dockerfile.find("RUN x").expect("RUN");
    let a2 = dockerfile.find("ENV A=2").expect("second ENV");
    assert!(a1 < run && run < a2);
}

#[test]
fn test_evaluator_optimizer_chain() {
    let text = "\
AGENT gen
INSTRUCTION Generate a draft.
AGENT eval
INSTRUCTION Critique the draft.
CHAIN loop
SEQUENCE gen eval gen
CUMULATIVE true
MAX_ITERATIONS 3
";
    let compiled = compile(text).unwrap();
    let chain = &compiled.manifest.chains[0];
    assert_eq!(chain.sequence.len(), 3);
    assert!(chain.cumulative);
    assert_eq!(chain.max_iterations, 3);

    let config = &compiled.artifacts.runtime_config;
    assert!(config.contains("cumulative: true"));
    assert!(config.contains("max_iterations: 3"));
    // The sole workflow entity resolves as the default.
    assert!(config.contains("default: true"));
}

#[test]
fn test_one_marked_default_among_many() {
    let mut text = String::new();
    for i in 0..10 {
        text.push_str(&format!("AGENT worker{i}\n"));
    }
    for i in 0..9 {
        text.push_str(&format!("CHAIN flow{i}\nSEQUENCE worker{i}\n"));
    }
    text.push_str("ORCHESTRATOR boss\nAGENTS worker0 worker1\nDEFAULT\n");

    let compiled = compile(&text).unwrap();
    assert_eq!(
        compiled.artifacts.runtime_config.matches("default: true").count(),
        1
    );
    let marked = compiled.manifest.marked_defaults();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].1, "boss");
}

#[test]
fn test_two_defaults_rejected() {
    let text = "\
AGENT a
ORCHESTRATOR first
AGENTS a
DEFAULT
ORCHESTRATOR second
AGENTS a
DEFAULT
";
    let err = compile(text).unwrap_err();
    let report = err.report().expect("validation report");
    assert!(report.diagnostics.iter().any(|d| d.code == "E203"));
}

#[test]
fn test_yaml_and_directives_agree() {
    let dsl = "\
FROM base:latest
MODEL haiku
MCP_SERVER fetch
COMMAND uvx
ARGS mcp-server-fetch
AGENT a
INSTRUCTION do X
SERVERS fetch
";
    let yaml = "\
apiVersion: v1
kind: Agent
base:
  image: base:latest
  model: haiku
mcp_servers:
  - name: fetch
    command: uvx
    args: [mcp-server-fetch]
agents:
  - name: a
    instruction: do X
    servers: [fetch]
";
    let ctx = CompileContext::default();
    let from_dsl = ManifestCompiler::compile(dsl, ManifestFormat::Directives, &ctx).unwrap();
    let from_yaml = ManifestCompiler::compile(yaml, ManifestFormat::Yaml, &ctx).unwrap();
    assert_eq!(from_dsl.manifest, from_yaml.manifest);
    assert_eq!(from_dsl.artifacts, from_yaml.artifacts);
}

#[test]
fn test_parse_error_is_fatal() {
    let err = compile("FROM base\nBOGUS x\n").unwrap_err();
    assert!(matches!(err, ManifestError::Parse { line: 2, .. }));
}

#[test]
fn test_secrets_flow_into_compose_and_config() {
    let text = "\
AGENT a
SECRET OPENAI_API_KEY
SECRET EXTRA=inline-value
";
    let compiled = compile(text).unwrap();
    assert!(compiled.artifacts.compose.contains("${OPENAI_API_KEY}"));
    assert!(compiled.artifacts.compose.contains("EXTRA: inline-value"));
    assert!(compiled.artifacts.runtime_config.contains("secrets:"));
    assert!(compiled
        .artifacts
        .runtime_config
        .contains("${OPENAI_API_KEY}"));
}

#[test]
fn test_requirements_artifact() {
    let text = "AGENT a\nMCP_SERVER fetch\nCOMMAND uvx\nARGS mcp-server-fetch\n";
    let compiled = compile(text).unwrap();
    let requirements = &compiled.artifacts.requirements;
    assert!(requirements.contains("fast-agent-mcp"));
    assert!(requirements.contains("uv>=0.4"));
}
