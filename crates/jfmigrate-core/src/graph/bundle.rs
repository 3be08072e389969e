//! Step bundles
//!
//! A step bundle carries everything needed to emit a reusable composite
//! action for one stage, independently of the workflow that calls it.

use crate::ast::{EnvironmentMap, PostBlock};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBundle {
    /// Bundle id, equal to the id of the job that runs it
    pub id: String,

    /// Name of the originating stage
    pub stage_name: String,

    /// Commands, verbatim
    pub commands: Vec<String>,

    /// Effective stage environment, exposed as bundle inputs
    #[serde(default, skip_serializing_if = "EnvironmentMap::is_empty")]
    pub environment: EnvironmentMap,

    /// Stage-level post hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostBlock>,
}

impl StepBundle {
    pub fn new(id: impl Into<String>, stage_name: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            id: id.into(),
            stage_name: stage_name.into(),
            commands,
            environment: EnvironmentMap::new(),
            post: None,
        }
    }

    /// No command and no post hook
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.post.as_ref().map_or(true, PostBlock::is_empty)
    }
}
