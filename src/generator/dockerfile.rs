//! Container build-file generator.
//!
//! User build steps always precede the fixed bootstrap block: in the target
//! format later instructions override earlier ENV/WORKDIR settings, so
//! bootstrap ordering is part of the artifact contract.

use crate::model::Manifest;

use super::RUNTIME_CONFIG_NAME;

pub(crate) fn generate(manifest: &Manifest) -> String {
    let mut lines = vec![format!("FROM {}", manifest.base_image), String::new()];

    if !manifest.build_steps.is_empty() {
        for step in &manifest.build_steps {
            lines.push(step.to_line());
        }
        lines.push(String::new());
    }

    lines.push("COPY requirements.txt .".to_string());
    lines.push("RUN pip install --no-cache-dir -r requirements.txt".to_string());
    lines.push(String::new());

    let workdir_set = manifest
        .build_steps
        .iter()
        .any(|s| s.instruction == "WORKDIR");
    if !workdir_set {
        lines.push("WORKDIR /app".to_string());
        lines.push(String::new());
    }

    lines.push(format!("COPY {RUNTIME_CONFIG_NAME} ."));
    lines.push(String::new());

    if !manifest.expose_ports.is_empty() {
        for port in &manifest.expose_ports {
            lines.push(format!("EXPOSE {port}"));
        }
        lines.push(String::new());
    }

    if !manifest.entrypoint.is_empty() {
        lines.push(format!(
            "ENTRYPOINT {}",
            serde_json::to_string(&manifest.entrypoint).unwrap_or_default()
        ));
    }
    lines.push(format!(
        "CMD {}",
        serde_json::to_string(&manifest.cmd).unwrap_or_default()
    ));

    lines.join("\n") + "\n"
}
