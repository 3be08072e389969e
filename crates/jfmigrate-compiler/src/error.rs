//! Compiler error types

use jfmigrate_core::CoreError;
use jfmigrate_parser::ParseError;
use thiserror::Error;

/// Job graph invariant violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The job graph contains a cycle
    #[error("Cyclic job graph involving: {}", .0.join(", "))]
    CyclicGraph(Vec<String>),

    /// A job depends on a job that does not exist
    #[error("Job '{job}' depends on unknown job '{dependency}'")]
    UnknownDependency { job: String, dependency: String },

    /// Two jobs were registered with the same id
    #[error("Duplicate job id: {0}")]
    DuplicateJob(String),
}

impl From<CoreError> for CompileError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CyclicGraph(ids) => CompileError::CyclicGraph(ids),
            CoreError::UnknownDependency { job, dependency } => {
                CompileError::UnknownDependency { job, dependency }
            }
            CoreError::DuplicateJob(id) => CompileError::DuplicateJob(id),
        }
    }
}

/// Errors of a whole conversion run
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Structural parse failure
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Job graph invariant failure
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Document rendering failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// Reading the source or writing a document failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_convert() {
        let err: CompileError = CoreError::CyclicGraph(vec!["a".into(), "b".into()]).into();
        assert_eq!(err.to_string(), "Cyclic job graph involving: a, b");
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: ConvertError = ParseError::MissingStages.into();
        assert_eq!(err.to_string(), ParseError::MissingStages.to_string());
    }
}
