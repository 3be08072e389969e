//! Pipeline AST definitions
//!
//! The pipeline is the root of the model extracted from a declarative
//! Jenkinsfile (`pipeline { ... }`).

use crate::ast::{AgentSpec, EnvironmentMap, ParameterSpec, PostBlock, StageNode};
use serde::{Deserialize, Serialize};

/// A declarative pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Global agent; `None` when absent or `agent none`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentSpec>,

    /// Declared parameters, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,

    /// Global environment
    #[serde(default, skip_serializing_if = "EnvironmentMap::is_empty")]
    pub environment: EnvironmentMap,

    /// Cron expression from `triggers { cron(...) }`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    /// Top-level stages, in document order
    pub stages: Vec<StageNode>,

    /// Pipeline-level post hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostBlock>,

    /// Shared libraries loaded with `@Library(...)`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,
}

impl Pipeline {
    pub fn new(stages: Vec<StageNode>) -> Self {
        Self {
            stages,
            ..Default::default()
        }
    }

    pub fn with_agent(mut self, agent: AgentSpec) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_cron(mut self, cron: impl Into<String>) -> Self {
        self.cron = Some(cron.into());
        self
    }

    pub fn with_post(mut self, post: PostBlock) -> Self {
        self.post = Some(post);
        self
    }

    /// Whether pipeline-level post hooks exist
    pub fn has_post(&self) -> bool {
        self.post.as_ref().is_some_and(|post| !post.is_empty())
    }

    /// Number of step stages in the whole tree
    pub fn leaf_count(&self) -> usize {
        self.stages.iter().map(StageNode::leaf_count).sum()
    }
}
