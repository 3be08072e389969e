//! Post block AST definitions
//!
//! A `post { }` block attaches hooks to the outcome of a stage or of the
//! whole pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome kinds recognized inside a post block, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCondition {
    Always,
    Success,
    Failure,
    Cleanup,
}

impl PostCondition {
    pub const ALL: [PostCondition; 4] = [
        PostCondition::Always,
        PostCondition::Success,
        PostCondition::Failure,
        PostCondition::Cleanup,
    ];

    /// Keyword introducing the condition block
    pub fn keyword(&self) -> &'static str {
        match self {
            PostCondition::Always => "always",
            PostCondition::Success => "success",
            PostCondition::Failure => "failure",
            PostCondition::Cleanup => "cleanup",
        }
    }

    /// Status check function evaluated by the runner.
    ///
    /// `cleanup` has no counterpart and runs unconditionally.
    pub fn status_function(&self) -> &'static str {
        match self {
            PostCondition::Always | PostCondition::Cleanup => "always()",
            PostCondition::Success => "success()",
            PostCondition::Failure => "failure()",
        }
    }
}

/// What to do for one outcome kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAction {
    /// `archiveArtifacts artifacts: '<glob>'`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,

    /// Shell commands, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,

    /// `mail to: '<address>'`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
}

impl PostAction {
    pub fn is_empty(&self) -> bool {
        self.archive.is_none() && self.commands.is_empty() && self.notify.is_none()
    }
}

/// Post hooks keyed by outcome kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostBlock {
    actions: BTreeMap<PostCondition, PostAction>,
}

impl PostBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action; empty actions are not stored
    pub fn insert(&mut self, condition: PostCondition, action: PostAction) {
        if !action.is_empty() {
            self.actions.insert(condition, action);
        }
    }

    pub fn with(mut self, condition: PostCondition, action: PostAction) -> Self {
        self.insert(condition, action);
        self
    }

    pub fn get(&self, condition: PostCondition) -> Option<&PostAction> {
        self.actions.get(&condition)
    }

    /// Actions in emission order (always, success, failure, cleanup)
    pub fn iter(&self) -> impl Iterator<Item = (PostCondition, &PostAction)> {
        self.actions.iter().map(|(condition, action)| (*condition, action))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_order_is_fixed() {
        let action = PostAction {
            commands: vec!["echo done".to_string()],
            ..Default::default()
        };
        let block = PostBlock::new()
            .with(PostCondition::Cleanup, action.clone())
            .with(PostCondition::Failure, action.clone())
            .with(PostCondition::Always, action);

        let order: Vec<_> = block.iter().map(|(condition, _)| condition).collect();
        assert_eq!(
            order,
            vec![PostCondition::Always, PostCondition::Failure, PostCondition::Cleanup]
        );
    }

    #[test]
    fn test_empty_action_is_not_stored() {
        let block = PostBlock::new().with(PostCondition::Success, PostAction::default());
        assert!(block.is_empty());
    }

    #[test]
    fn test_cleanup_runs_unconditionally() {
        assert_eq!(PostCondition::Cleanup.status_function(), "always()");
        assert_eq!(PostCondition::Failure.status_function(), "failure()");
    }
}
