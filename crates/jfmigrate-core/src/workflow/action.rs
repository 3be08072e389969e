//! Composite action documents

use super::Step;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A composite action (`action.yml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeAction {
    pub name: String,

    pub description: String,

    /// Declared inputs, keyed by input id
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, ActionInput>,

    pub runs: CompositeRuns,
}

/// An action input with its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInput {
    pub description: String,
    pub required: bool,
    pub default: String,
}

/// The `runs:` section of a composite action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRuns {
    /// Always `composite`
    pub using: String,
    pub steps: Vec<Step>,
}

impl CompositeAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            inputs: IndexMap::new(),
            runs: CompositeRuns {
                using: "composite".to_string(),
                steps: Vec::new(),
            },
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.runs.steps
    }
}
