//! Error types for manifest compilation.
//!
//! - [`ManifestError`] — Top-level errors for parsing, model building, and validation.

pub mod manifest_error;

pub use manifest_error::ManifestError;

/// Convenience alias for compilation-level results.
pub type ManifestResult<T> = Result<T, ManifestError>;
