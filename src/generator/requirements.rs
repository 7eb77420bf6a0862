//! Dependency-list generator.
//!
//! Emits the runtime libraries the execution framework needs, plus extras
//! implied by declared servers. Output is deduplicated and sorted.

use std::collections::BTreeSet;

use crate::model::Manifest;

/// Libraries the generated host program always needs.
const FRAMEWORK_REQUIREMENTS: &[&str] = &["fast-agent-mcp>=0.2.33", "deprecated>=1.2.18"];

/// Extra packages implied by a server's launch command. Package-runner
/// launched servers resolve their own dependencies, but the runner itself
/// must be present in the image.
fn command_extras(command: &str) -> &'static [&'static str] {
    match command {
        "uvx" | "uv" => &["uv>=0.4"],
        _ => &[],
    }
}

pub(crate) fn generate(manifest: &Manifest) -> String {
    let mut requirements: BTreeSet<&str> = FRAMEWORK_REQUIREMENTS.iter().copied().collect();
    for server in &manifest.servers {
        requirements.extend(command_extras(&server.command));
    }
    let lines: Vec<&str> = requirements.into_iter().collect();
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolServer;

    #[test]
    fn test_framework_requirements_present_and_sorted() {
        let text = generate(&Manifest::default());
        assert!(text.contains("fast-agent-mcp"));
        assert!(text.contains("deprecated"));
        let lines: Vec<&str> = text.lines().collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_uvx_server_pulls_runner() {
        let mut manifest = Manifest::default();
        let mut server = ToolServer::new("fetch");
        server.command = "uvx".to_string();
        manifest.servers.push(server);
        assert!(generate(&manifest).contains("uv>=0.4"));
    }

    #[test]
    fn test_npx_server_adds_nothing() {
        let mut manifest = Manifest::default();
        let mut server = ToolServer::new("github");
        server.command = "npx".to_string();
        manifest.servers.push(server);
        assert!(!generate(&manifest).contains("uv>=0.4"));
    }

    #[test]
    fn test_deterministic() {
        let manifest = Manifest::default();
        assert_eq!(generate(&manifest), generate(&manifest));
    }
}
