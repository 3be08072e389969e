//! Stage AST definitions
//!
//! Stages form a recursive tree: a stage either runs its own commands or fans
//! out into a group of parallel child stages.

use crate::ast::{AgentSpec, EnvironmentMap, PostBlock};
use serde::{Deserialize, Serialize};

/// A named stage of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageNode {
    /// Stage name (unique among siblings only)
    pub name: String,

    /// Agent override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentSpec>,

    /// Stage-scoped environment, as declared
    #[serde(default, skip_serializing_if = "EnvironmentMap::is_empty")]
    pub environment: EnvironmentMap,

    /// `when { branch ... }` guard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<BranchGuard>,

    /// Stage-level post hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostBlock>,

    /// Commands or parallel children
    pub body: StageBody,
}

/// What a stage does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageBody {
    /// Ordered shell commands
    Steps { commands: Vec<String> },

    /// Child stages that run side by side
    Parallel { stages: Vec<StageNode> },
}

/// Branch restriction from a `when` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchGuard {
    /// Branch name or glob pattern (`release-*`)
    pub branch: String,
}

impl BranchGuard {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.branch.contains('*') || self.branch.contains('?')
    }
}

impl StageNode {
    /// A stage running the given commands
    pub fn steps(name: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            name: name.into(),
            agent: None,
            environment: EnvironmentMap::new(),
            when: None,
            post: None,
            body: StageBody::Steps { commands },
        }
    }

    /// A stage fanning out into parallel children
    pub fn parallel(name: impl Into<String>, stages: Vec<StageNode>) -> Self {
        Self {
            name: name.into(),
            agent: None,
            environment: EnvironmentMap::new(),
            when: None,
            post: None,
            body: StageBody::Parallel { stages },
        }
    }

    pub fn with_agent(mut self, agent: AgentSpec) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.when = Some(BranchGuard::new(branch));
        self
    }

    pub fn with_post(mut self, post: PostBlock) -> Self {
        self.post = Some(post);
        self
    }

    /// Commands of a step stage; empty for a parallel stage
    pub fn commands(&self) -> &[String] {
        match &self.body {
            StageBody::Steps { commands } => commands,
            StageBody::Parallel { .. } => &[],
        }
    }

    /// Children of a parallel stage; empty for a step stage
    pub fn children(&self) -> &[StageNode] {
        match &self.body {
            StageBody::Steps { .. } => &[],
            StageBody::Parallel { stages } => stages,
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.body, StageBody::Parallel { .. })
    }

    /// Number of step stages in this subtree
    pub fn leaf_count(&self) -> usize {
        match &self.body {
            StageBody::Steps { .. } => 1,
            StageBody::Parallel { stages } => stages.iter().map(StageNode::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_stage_accessors() {
        let stage = StageNode::steps("Build", vec!["make".to_string()]);
        assert_eq!(stage.commands(), &["make".to_string()]);
        assert!(stage.children().is_empty());
        assert!(!stage.is_parallel());
    }

    #[test]
    fn test_nested_leaf_count() {
        let inner = StageNode::parallel(
            "Inner",
            vec![
                StageNode::steps("A", vec![]),
                StageNode::steps("B", vec![]),
            ],
        );
        let outer = StageNode::parallel("Outer", vec![inner, StageNode::steps("C", vec![])]);
        assert_eq!(outer.leaf_count(), 3);
        assert!(outer.commands().is_empty());
    }

    #[test]
    fn test_branch_pattern_detection() {
        assert!(BranchGuard::new("release-*").is_pattern());
        assert!(!BranchGuard::new("main").is_pattern());
    }
}
