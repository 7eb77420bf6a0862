//! Manifest front-ends.
//!
//! Two syntaxes are accepted: a line-oriented directive syntax and a
//! structured YAML syntax. Both converge on the same ordered sequence of
//! [`Directive`] records, which is the only interface the model builder
//! sees — adding a third syntax touches nothing downstream.

pub mod directive;
pub mod parser;
pub mod schema;
pub mod structured;

pub use directive::{Directive, DirectiveKind};
pub use parser::{detect_format, parse_manifest, ManifestFormat};
