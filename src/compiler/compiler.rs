//! Top-level compilation pipeline.

use crate::dsl::{detect_format, parse_manifest, ManifestFormat};
use crate::error::ManifestError;
use crate::generator::Artifacts;
use crate::model::{build_manifest, CompileContext, Manifest};
use crate::validation::{validate_manifest, ValidationReport};

/// Compiles manifest text into deployable artifacts.
pub struct ManifestCompiler;

impl ManifestCompiler {
    /// Compile manifest text, auto-detecting the syntax.
    pub fn compile_auto(
        content: &str,
        ctx: &CompileContext,
    ) -> Result<CompiledManifest, ManifestError> {
        Self::compile(content, detect_format(content), ctx)
    }

    /// Compile manifest text in the given syntax.
    ///
    /// Either all four artifacts are produced or none: validation failure
    /// returns the full diagnostic report before any generator runs.
    pub fn compile(
        content: &str,
        format: ManifestFormat,
        ctx: &CompileContext,
    ) -> Result<CompiledManifest, ManifestError> {
        let directives = parse_manifest(content, format)?;
        let manifest = build_manifest(directives, ctx)?;
        Self::compile_model(manifest)
    }

    /// Compile a pre-built manifest model.
    pub fn compile_model(manifest: Manifest) -> Result<CompiledManifest, ManifestError> {
        let report = validate_manifest(&manifest);
        if !report.is_valid {
            return Err(ManifestError::ValidationFailed(Box::new(report)));
        }
        tracing::debug!(
            servers = manifest.servers.len(),
            agents = manifest.agents.len(),
            workflows = manifest.workflow_count(),
            "manifest validated"
        );
        let artifacts = Artifacts::generate(&manifest);
        Ok(CompiledManifest {
            manifest,
            report,
            artifacts,
        })
    }
}

/// Result of a successful compilation run.
///
/// The report is kept for its warnings; it never contains errors here.
#[derive(Debug, Clone)]
pub struct CompiledManifest {
    pub manifest: Manifest,
    pub report: ValidationReport,
    pub artifacts: Artifacts,
}
