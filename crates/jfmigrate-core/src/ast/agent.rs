//! Agent AST definitions
//!
//! An agent tells Jenkins where a pipeline or a stage runs. It is declared
//! once at pipeline level and may be overridden per stage.

use serde::{Deserialize, Serialize};

/// Where a pipeline or stage executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AgentSpec {
    /// `agent any`
    Any,

    /// `agent { label 'linux' }`
    Label {
        /// Node label
        label: String,
    },

    /// `agent { docker { image 'node:20' args '-v /tmp:/tmp' } }`
    Docker {
        /// Container image
        image: String,
        /// Extra `docker run` arguments
        #[serde(skip_serializing_if = "Option::is_none")]
        args: Option<String>,
    },
}

impl AgentSpec {
    pub fn label(label: impl Into<String>) -> Self {
        AgentSpec::Label {
            label: label.into(),
        }
    }

    pub fn docker(image: impl Into<String>) -> Self {
        AgentSpec::Docker {
            image: image.into(),
            args: None,
        }
    }

    /// Set docker run arguments; no effect on other agent kinds
    pub fn with_args(self, run_args: impl Into<String>) -> Self {
        match self {
            AgentSpec::Docker { image, .. } => AgentSpec::Docker {
                image,
                args: Some(run_args.into()),
            },
            other => other,
        }
    }

    /// Container image, if this agent runs in one
    pub fn image(&self) -> Option<&str> {
        match self {
            AgentSpec::Docker { image, .. } => Some(image),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docker_with_args() {
        let agent = AgentSpec::docker("node:20").with_args("--cpus=2");
        assert_eq!(
            agent,
            AgentSpec::Docker {
                image: "node:20".to_string(),
                args: Some("--cpus=2".to_string()),
            }
        );
        assert_eq!(agent.image(), Some("node:20"));
    }

    #[test]
    fn test_with_args_ignored_for_label() {
        let agent = AgentSpec::label("linux").with_args("--cpus=2");
        assert_eq!(agent, AgentSpec::label("linux"));
        assert_eq!(agent.image(), None);
    }
}
