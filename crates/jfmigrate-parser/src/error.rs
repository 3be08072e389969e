//! Parser error types

use thiserror::Error;

/// Structural errors that abort a conversion
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No `pipeline { ... }` block
    #[error("Not a declarative pipeline (no 'pipeline {{ ... }}' block found)")]
    NotDeclarativePipeline,

    /// No `stages { ... }` block inside the pipeline
    #[error("No 'stages {{ ... }}' block found in pipeline")]
    MissingStages,

    /// A stage declares both its own steps and a parallel group
    #[error("Stage '{stage}' declares both steps and a parallel group")]
    AmbiguousStage { stage: String },
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::NotDeclarativePipeline.to_string(),
            "Not a declarative pipeline (no 'pipeline { ... }' block found)"
        );
        assert!(ParseError::AmbiguousStage {
            stage: "Build".to_string()
        }
        .to_string()
        .contains("'Build'"));
    }
}
