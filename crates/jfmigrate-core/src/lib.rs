//! jfmigrate Core - Core types and definitions for jfmigrate
//!
//! This crate provides the fundamental types shared by the parser, the
//! compiler and the CLI:
//! - AST (pipeline model extracted from a declarative Jenkinsfile)
//! - Job graph IR (dependency-ordered jobs and their step bundles)
//! - Workflow documents (the serializable GitHub Actions output)
//! - Diagnostics and error types

pub mod ast;
pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod workflow;

// Re-export commonly used types
pub use ast::{
    AgentSpec, BranchGuard, EnvironmentMap, ParameterKind, ParameterSpec, ParameterValue,
    Pipeline, PostAction, PostBlock, PostCondition, StageBody, StageNode,
};
pub use diagnostic::{Diagnostic, DiagnosticCode, Extracted, Severity};
pub use error::{CoreError, Result};
pub use graph::{ContainerSpec, JobAction, JobGraph, JobNode, RunTarget, StepBundle};
pub use workflow::{CompositeAction, Job, Needs, Step, Workflow};
