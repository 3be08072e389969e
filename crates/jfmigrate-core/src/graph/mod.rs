//! Job graph IR
//!
//! The job graph is the compilation target of the stage tree. It is a
//! lower-level representation close to the target CI model:
//! - one [`JobNode`] per step stage, each referencing a [`StepBundle`]
//! - dependency edges expressed as predecessor sets
//! - an optional terminal aggregate job replaying pipeline-level post hooks

pub mod bundle;
pub mod job;
pub mod job_graph;

pub use bundle::StepBundle;
pub use job::{ContainerSpec, JobAction, JobNode, RunTarget};
pub use job_graph::JobGraph;
