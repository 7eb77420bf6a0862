//! Manifest compiler: front-ends, model builder, validator and generators
//! tied into one all-or-nothing pipeline.

pub mod compiler;

pub use compiler::{CompiledManifest, ManifestCompiler};
