//! Compilation-level error types.

use crate::validation::ValidationReport;
use thiserror::Error;

/// Errors produced while compiling a manifest.
///
/// Parse and build errors are fatal to the run; `ValidationFailed` carries
/// the full set of collected diagnostics rather than the first violation.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("parse error at {path}: {message}")]
    Structured { path: String, message: String },
    #[error("model build error: {0}")]
    BuildError(String),
    #[error("validation failed")]
    ValidationFailed(Box<ValidationReport>),
}

impl ManifestError {
    /// The validation report, when this error carries one.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            ManifestError::ValidationFailed(report) => Some(report),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_display() {
        assert_eq!(
            ManifestError::Parse {
                line: 3,
                message: "unknown directive: BOGUS".into()
            }
            .to_string(),
            "parse error at line 3: unknown directive: BOGUS"
        );
        assert_eq!(
            ManifestError::Structured {
                path: "mcp_servers[0].transport".into(),
                message: "invalid transport".into()
            }
            .to_string(),
            "parse error at mcp_servers[0].transport: invalid transport"
        );
        assert_eq!(
            ManifestError::BuildError("x".into()).to_string(),
            "model build error: x"
        );
    }

    #[test]
    fn test_manifest_error_report() {
        let report = ValidationReport {
            is_valid: false,
            diagnostics: vec![],
        };
        let err = ManifestError::ValidationFailed(Box::new(report));
        assert!(err.report().is_some());
        assert_eq!(err.to_string(), "validation failed");

        let err = ManifestError::BuildError("x".into());
        assert!(err.report().is_none());
    }
}
