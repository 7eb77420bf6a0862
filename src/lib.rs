//! # agentforge — a manifest compiler for multi-agent AI systems
//!
//! `agentforge` compiles a declarative manifest describing agents, the MCP
//! tool servers they call, and their compositions (chains, routers,
//! orchestrators) into four deployable artifacts: a container build file, a
//! container composition file, the runtime configuration the execution
//! framework consumes, and a dependency list.
//!
//! Two manifest syntaxes are accepted — a Dockerfile-like directive syntax
//! and a structured YAML syntax. Both front-ends lower to one shared
//! directive record shape, so the model builder, validator and generators
//! never see raw text.
//!
//! The pipeline is strictly one-directional and pure:
//!
//! ```text
//! text -> directives -> Manifest -> ValidationReport -> Artifacts
//! ```
//!
//! Validation collects every violation into one report instead of failing
//! on the first, and artifact generation is all-or-nothing: a manifest that
//! fails validation produces no artifacts at all.
//!
//! # Quick Start
//!
//! ```rust
//! use agentforge::{CompileContext, ManifestCompiler, ManifestFormat};
//!
//! let text = "FROM python:3.12-slim\nAGENT greeter\nINSTRUCTION Say hello.\n";
//! let compiled = ManifestCompiler::compile(
//!     text,
//!     ManifestFormat::Directives,
//!     &CompileContext::default(),
//! )
//! .unwrap();
//! assert!(compiled.artifacts.dockerfile.contains("FROM python:3.12-slim"));
//! assert!(compiled.artifacts.runtime_config.contains("greeter"));
//! ```

pub mod compiler;
pub mod convert;
pub mod dsl;
pub mod error;
pub mod generator;
pub mod model;
pub mod validation;

pub use crate::compiler::{CompiledManifest, ManifestCompiler};
pub use crate::convert::{render_dsl, render_structured};
pub use crate::dsl::{detect_format, parse_manifest, Directive, DirectiveKind, ManifestFormat};
pub use crate::error::{ManifestError, ManifestResult};
pub use crate::generator::Artifacts;
pub use crate::model::{
    build_manifest, Agent, BuildStep, Chain, CompileContext, Manifest, Orchestrator, PlanType,
    Router, Secret, ToolServer, Transport, WorkflowKind,
};
pub use crate::validation::{
    validate_manifest, validate_text, Diagnostic, DiagnosticLevel, ValidationReport,
};
