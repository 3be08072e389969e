//! Job nodes

use crate::ast::{EnvironmentMap, PostBlock};
use serde::{Deserialize, Serialize};

/// Runner selection (`runs-on:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunTarget {
    /// A single runner label, e.g. `ubuntu-latest`
    Hosted(String),
    /// Several labels, e.g. `[self-hosted, linux]`
    Labels(Vec<String>),
}

impl RunTarget {
    pub fn hosted(label: impl Into<String>) -> Self {
        RunTarget::Hosted(label.into())
    }

    pub fn self_hosted(label: impl Into<String>) -> Self {
        RunTarget::Labels(vec!["self-hosted".to_string(), label.into()])
    }
}

impl Default for RunTarget {
    fn default() -> Self {
        RunTarget::hosted("ubuntu-latest")
    }
}

/// Job container (`container:`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image: String,

    /// Extra `docker create` options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

/// What a job executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobAction {
    /// Runs the step bundle with this id
    Bundle(String),
    /// Terminal aggregate job replaying pipeline-level post hooks
    PipelinePost(PostBlock),
}

/// A job of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNode {
    /// Job id, unique across the graph
    pub id: String,

    /// Display name (the stage name)
    pub name: String,

    pub runs_on: RunTarget,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<ContainerSpec>,

    /// Environment diff against the global environment
    #[serde(default, skip_serializing_if = "EnvironmentMap::is_empty")]
    pub environment: EnvironmentMap,

    /// Runtime guard expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Predecessor job ids, in order
    #[serde(default)]
    pub needs: Vec<String>,

    pub action: JobAction,
}

impl JobNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, action: JobAction) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            runs_on: RunTarget::default(),
            container: None,
            environment: EnvironmentMap::new(),
            condition: None,
            needs: Vec::new(),
            action,
        }
    }

    pub fn with_needs(mut self, needs: Vec<String>) -> Self {
        self.needs = needs;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Id of the bundle run by this job
    pub fn bundle_id(&self) -> Option<&str> {
        match &self.action {
            JobAction::Bundle(id) => Some(id),
            JobAction::PipelinePost(_) => None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.action, JobAction::PipelinePost(_))
    }
}
