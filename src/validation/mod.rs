//! Manifest validator.
//!
//! Every violation is collected into one [`ValidationReport`] so all
//! problems are reported together. Layers run in resolution order:
//! structure and uniqueness first, then cross-entity references in
//! declaration order, then numeric ranges and default-workflow rules.

mod layer1_structure;
mod layer2_references;
mod layer3_semantic;
mod types;

use crate::dsl::{parse_manifest, ManifestFormat};
use crate::model::{build_manifest, CompileContext, Manifest};

pub use types::{Diagnostic, DiagnosticLevel, ValidationReport};

/// Validate raw manifest text, folding parse and build failures into the
/// report as an `E001` diagnostic.
pub fn validate_text(
    content: &str,
    format: ManifestFormat,
    ctx: &CompileContext,
) -> ValidationReport {
    let manifest =
        parse_manifest(content, format).and_then(|directives| build_manifest(directives, ctx));
    match manifest {
        Ok(manifest) => validate_manifest(&manifest),
        Err(err) => ValidationReport {
            is_valid: false,
            diagnostics: vec![Diagnostic {
                level: DiagnosticLevel::Error,
                code: "E001".to_string(),
                message: err.to_string(),
                entity: None,
                field: None,
            }],
        },
    }
}

/// Validate a built manifest, collecting every violation.
pub fn validate_manifest(manifest: &Manifest) -> ValidationReport {
    let mut diagnostics = Vec::new();

    diagnostics.extend(layer1_structure::validate(manifest));
    diagnostics.extend(layer2_references::validate(manifest));
    diagnostics.extend(layer3_semantic::validate(manifest));

    let is_valid = diagnostics
        .iter()
        .all(|d| d.level != DiagnosticLevel::Error);

    ValidationReport {
        is_valid,
        diagnostics,
    }
}
