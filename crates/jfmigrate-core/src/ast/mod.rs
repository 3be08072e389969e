//! Abstract Syntax Tree (AST) definitions for jfmigrate
//!
//! This module contains the pipeline model extracted from a declarative
//! Jenkinsfile:
//! - Agents
//! - Parameters
//! - Environment maps
//! - Post blocks
//! - Stages (a recursive tree of step stages and parallel groups)
//! - The pipeline itself

pub mod agent;
pub mod environment;
pub mod parameter;
pub mod pipeline;
pub mod post;
pub mod stage;

pub use agent::AgentSpec;
pub use environment::{diff_environment, overlay_environment, EnvironmentMap};
pub use parameter::{ParameterKind, ParameterSpec, ParameterValue};
pub use pipeline::Pipeline;
pub use post::{PostAction, PostBlock, PostCondition};
pub use stage::{BranchGuard, StageBody, StageNode};
