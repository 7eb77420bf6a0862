//! Canonical manifest model and the directive fold that builds it.

pub mod builder;
pub mod types;

pub use builder::{build_manifest, CompileContext};
pub use types::{
    Agent, BuildStep, Chain, Manifest, Orchestrator, PlanType, Router, Secret, ToolServer,
    Transport, WorkflowKind,
};
