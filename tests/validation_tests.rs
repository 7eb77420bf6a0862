//! Validator behavior: every violation collected into one ordered report.

use agentforge::{validate_text, CompileContext, DiagnosticLevel, ManifestFormat};

fn validate(text: &str) -> agentforge::ValidationReport {
    validate_text(text, ManifestFormat::Directives, &CompileContext::default())
}

#[test]
fn test_all_violations_reported_together() {
    let text = "\
AGENT a
SERVERS ghost
AGENT a
CHAIN c
CHAIN empty
SEQUENCE a
MAX_ITERATIONS 0
ROUTER r
AGENTS nobody
";
    let report = validate(text);
    assert!(!report.is_valid);
    // Duplicate agent, dangling server, empty sequence, zero iterations
    // and a dangling router agent all land in one report.
    assert!(report.has_code("E003"));
    assert!(report.has_code("E101"));
    assert!(report.has_code("E009"));
    assert!(report.has_code("E201"));
    assert!(report.has_code("E103"));
    assert!(report.errors().len() >= 5);
}

#[test]
fn test_resolution_order() {
    let text = "\
AGENT a
AGENT a
CHAIN c
SEQUENCE ghost
MAX_ITERATIONS 0
";
    let report = validate(text);
    let codes: Vec<&str> = report
        .diagnostics
        .iter()
        .map(|d| d.code.as_str())
        .collect();
    let dup = codes.iter().position(|c| *c == "E003").unwrap();
    let reference = codes.iter().position(|c| *c == "E102").unwrap();
    let range = codes.iter().position(|c| *c == "E201").unwrap();
    assert!(dup < reference && reference < range);
}

#[test]
fn test_duplicate_names_not_silently_merged() {
    let report = validate("MCP_SERVER s\nCOMMAND a\nMCP_SERVER s\nCOMMAND b\n");
    assert!(report.has_code("E002"));
}

#[test]
fn test_repeated_env_is_not_an_error() {
    let report = validate("ENV A=1\nENV A=2\nAGENT a\n");
    assert!(report.is_valid);
}

#[test]
fn test_ambiguous_default_fails() {
    let report = validate("AGENT a\nCHAIN c1\nSEQUENCE a\nCHAIN c2\nSEQUENCE a\n");
    assert!(report.has_code("E204"));
}

#[test]
fn test_marked_default_resolves_ambiguity() {
    let report = validate("AGENT a\nCHAIN c1\nSEQUENCE a\nCHAIN c2\nSEQUENCE a\nDEFAULT\n");
    assert!(report.is_valid);
}

#[test]
fn test_exact_name_equality_no_case_folding() {
    let report = validate("MCP_SERVER Fetch\nCOMMAND uvx\nAGENT a\nSERVERS fetch\n");
    assert!(report.has_code("E101"));
}

#[test]
fn test_unused_agent_is_warning_only() {
    let report = validate("AGENT used\nAGENT idle\nCHAIN c\nSEQUENCE used\n");
    assert!(report.is_valid);
    let warning = report
        .diagnostics
        .iter()
        .find(|d| d.code == "W101")
        .expect("unused-agent warning");
    assert_eq!(warning.level, DiagnosticLevel::Warning);
}

#[test]
fn test_parse_failure_reported_as_single_diagnostic() {
    let report = validate("NOT_A_DIRECTIVE\n");
    assert!(!report.is_valid);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].code, "E001");
}
