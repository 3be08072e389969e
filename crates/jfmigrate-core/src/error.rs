//! Error types for jfmigrate Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A job depends on an identifier that is not part of the graph
    #[error("Job '{job}' depends on unknown job '{dependency}'")]
    UnknownDependency { job: String, dependency: String },

    /// Two jobs share the same identifier
    #[error("Duplicate job identifier: {0}")]
    DuplicateJob(String),

    /// The dependency edges form a cycle
    #[error("Dependency cycle detected involving jobs: {}", .0.join(", "))]
    CyclicGraph(Vec<String>),
}

pub type Result<T> = std::result::Result<T, CoreError>;
