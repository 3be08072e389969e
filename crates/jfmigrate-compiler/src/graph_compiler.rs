//! Job graph compiler
//!
//! Compiles the stage tree of a [`Pipeline`] into a [`JobGraph`] and one
//! [`StepBundle`] per step stage.
//!
//! The walk follows document order and keeps a running frontier: the job ids
//! that completed immediately before the current position.
//! - A step stage becomes one job needing the whole frontier, and the frontier
//!   becomes that job.
//! - A parallel stage compiles every child against the same entry frontier;
//!   the frontier after the group is the union of the children's exits.
//! - Pipeline-level post hooks become a terminal job needing every leaf.

use crate::error::Result;
use crate::slug::{slugify, SlugRegistry};
use jfmigrate_core::ast::{diff_environment, overlay_environment};
use jfmigrate_core::{
    AgentSpec, BranchGuard, ContainerSpec, Diagnostic, DiagnosticCode, EnvironmentMap, JobAction,
    JobGraph, JobNode, Pipeline, RunTarget, StageBody, StageNode, StepBundle,
};

/// Id of the terminal job replaying pipeline-level post hooks
pub const PIPELINE_POST_JOB: &str = "pipeline-post";

/// Output of a compilation pass
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPipeline {
    pub graph: JobGraph,
    /// Bundles in job order
    pub bundles: Vec<StepBundle>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledPipeline {
    pub fn bundle(&self, id: &str) -> Option<&StepBundle> {
        self.bundles.iter().find(|bundle| bundle.id == id)
    }
}

/// Context inherited from enclosing parallel stages
#[derive(Debug, Clone, Default)]
struct Scope {
    agent: Option<AgentSpec>,
    environment: EnvironmentMap,
    condition: Option<String>,
}

/// Job graph compiler
pub struct JobGraphCompiler<'a> {
    pipeline: &'a Pipeline,
    slugs: SlugRegistry,
    graph: JobGraph,
    bundles: Vec<StepBundle>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> JobGraphCompiler<'a> {
    /// Compile a pipeline into a validated job graph
    pub fn compile(pipeline: &'a Pipeline) -> Result<CompiledPipeline> {
        let mut compiler = Self {
            pipeline,
            slugs: SlugRegistry::new(),
            graph: JobGraph::new(),
            bundles: Vec::new(),
            diagnostics: Vec::new(),
        };

        let scope = Scope {
            agent: pipeline.agent.clone(),
            ..Default::default()
        };
        let exits = compiler.compile_sequence(&pipeline.stages, Vec::new(), &scope)?;
        compiler.compile_pipeline_post()?;
        compiler.graph.validate()?;

        tracing::debug!(
            "Compiled {} jobs, final frontier: [{}]",
            compiler.graph.len(),
            exits.join(", ")
        );

        Ok(CompiledPipeline {
            graph: compiler.graph,
            bundles: compiler.bundles,
            diagnostics: compiler.diagnostics,
        })
    }

    /// Sequential stages; each one waits for the previous one
    fn compile_sequence(
        &mut self,
        stages: &[StageNode],
        mut frontier: Vec<String>,
        scope: &Scope,
    ) -> Result<Vec<String>> {
        for stage in stages {
            frontier = self.compile_stage(stage, frontier, scope)?;
        }
        Ok(frontier)
    }

    fn compile_stage(
        &mut self,
        stage: &StageNode,
        frontier: Vec<String>,
        scope: &Scope,
    ) -> Result<Vec<String>> {
        match &stage.body {
            StageBody::Steps { commands } => self.compile_step_stage(stage, commands, frontier, scope),
            StageBody::Parallel { stages } => self.compile_parallel(stage, stages, frontier, scope),
        }
    }

    fn compile_step_stage(
        &mut self,
        stage: &StageNode,
        commands: &[String],
        frontier: Vec<String>,
        scope: &Scope,
    ) -> Result<Vec<String>> {
        let element = format!("stage '{}'", stage.name);

        let base = slugify(&stage.name);
        let (id, collided) = self.slugs.register(&base);
        if collided {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::DuplicateJobId,
                &element,
                format!("job id '{}' is already taken, using '{}'", base, id),
            ));
        }

        let agent = stage.agent.as_ref().or(scope.agent.as_ref());
        let (runs_on, container) = runner_for(agent);

        let effective = overlay_environment(&scope.environment, &stage.environment);
        let environment = diff_environment(&effective, &self.pipeline.environment);

        let own_condition = stage
            .when
            .as_ref()
            .map(|guard| self.branch_condition(guard, &element));
        let condition = conjoin(scope.condition.clone(), own_condition);

        let bundle = StepBundle {
            id: id.clone(),
            stage_name: stage.name.clone(),
            commands: commands.to_vec(),
            environment: effective,
            post: stage.post.clone().filter(|post| !post.is_empty()),
        };
        if bundle.is_empty() {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::EmptyStage,
                &element,
                "stage has no step to run, a placeholder step is emitted",
            ));
        }

        let job = JobNode {
            id: id.clone(),
            name: stage.name.clone(),
            runs_on,
            container,
            environment,
            condition,
            needs: frontier,
            action: JobAction::Bundle(id.clone()),
        };

        tracing::debug!("Job '{}' needs [{}]", job.id, job.needs.join(", "));
        self.graph.push(job)?;
        self.bundles.push(bundle);

        Ok(vec![id])
    }

    fn compile_parallel(
        &mut self,
        stage: &StageNode,
        children: &[StageNode],
        frontier: Vec<String>,
        scope: &Scope,
    ) -> Result<Vec<String>> {
        let element = format!("stage '{}'", stage.name);

        if stage.post.as_ref().is_some_and(|post| !post.is_empty()) {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::ParallelPostIgnored,
                &element,
                "post block on a parallel stage is not translated",
            ));
        }

        if children.is_empty() {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::EmptyStage,
                &element,
                "parallel group has no stage, skipped",
            ));
            return Ok(frontier);
        }

        let own_condition = stage
            .when
            .as_ref()
            .map(|guard| self.branch_condition(guard, &element));
        let child_scope = Scope {
            agent: stage.agent.clone().or_else(|| scope.agent.clone()),
            environment: overlay_environment(&scope.environment, &stage.environment),
            condition: conjoin(scope.condition.clone(), own_condition),
        };

        let mut exits = Vec::new();
        for child in children {
            for id in self.compile_stage(child, frontier.clone(), &child_scope)? {
                if !exits.contains(&id) {
                    exits.push(id);
                }
            }
        }
        Ok(exits)
    }

    /// Terminal job needing every leaf, when pipeline-level post hooks exist
    fn compile_pipeline_post(&mut self) -> Result<()> {
        let Some(post) = self.pipeline.post.as_ref().filter(|post| !post.is_empty()) else {
            return Ok(());
        };

        let (id, collided) = self.slugs.register(PIPELINE_POST_JOB);
        if collided {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::DuplicateJobId,
                "pipeline post",
                format!("job id '{}' is already taken, using '{}'", PIPELINE_POST_JOB, id),
            ));
        }

        let needs: Vec<String> = self.graph.leaves().into_iter().map(str::to_string).collect();
        let (runs_on, container) = runner_for(self.pipeline.agent.as_ref());

        let job = JobNode {
            id,
            name: "Pipeline Post".to_string(),
            runs_on,
            container,
            environment: EnvironmentMap::new(),
            condition: Some("always()".to_string()),
            needs,
            action: JobAction::PipelinePost(post.clone()),
        };
        self.graph.push(job)?;
        Ok(())
    }

    /// Runtime expression for a branch guard
    fn branch_condition(&mut self, guard: &BranchGuard, element: &str) -> String {
        let (condition, exact) = branch_condition(guard);
        if !exact {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticCode::ApproximateGuard,
                element,
                format!(
                    "branch pattern '{}' is approximated by '{}'",
                    guard.branch, condition
                ),
            ));
        }
        condition
    }
}

/// Guard expression for a branch, and whether it matches exactly the branches
/// the pattern matches
pub fn branch_condition(guard: &BranchGuard) -> (String, bool) {
    let branch = guard.branch.trim();
    if !guard.is_pattern() {
        return (format!("github.ref == 'refs/heads/{}'", branch), true);
    }

    let wildcard = branch.find(['*', '?']).unwrap_or(branch.len());
    let prefix = &branch[..wildcard];
    let exact = branch.ends_with('*') && wildcard == branch.len() - 1;
    (
        format!("startsWith(github.ref, 'refs/heads/{}')", prefix),
        exact,
    )
}

/// Runner and container for an agent; no agent means the hosted default
pub fn runner_for(agent: Option<&AgentSpec>) -> (RunTarget, Option<ContainerSpec>) {
    match agent {
        None | Some(AgentSpec::Any) => (RunTarget::default(), None),
        Some(AgentSpec::Label { label }) => (runner_for_label(label), None),
        Some(AgentSpec::Docker { image, args }) => (
            RunTarget::default(),
            Some(ContainerSpec {
                image: image.clone(),
                options: args.clone(),
            }),
        ),
    }
}

/// Hosted runner for well-known labels, self-hosted otherwise
pub fn runner_for_label(label: &str) -> RunTarget {
    let normalized = label.trim().to_lowercase();
    if normalized.starts_with("ubuntu") {
        RunTarget::hosted("ubuntu-latest")
    } else if normalized.starts_with("windows") {
        RunTarget::hosted("windows-latest")
    } else if normalized == "mac" || normalized.starts_with("macos") {
        RunTarget::hosted("macos-latest")
    } else {
        RunTarget::self_hosted(label.trim())
    }
}

fn conjoin(outer: Option<String>, inner: Option<String>) -> Option<String> {
    match (outer, inner) {
        (Some(outer), Some(inner)) => Some(format!("{} && {}", outer, inner)),
        (outer, inner) => outer.or(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jfmigrate_core::{PostAction, PostBlock, PostCondition};

    fn steps(name: &str, command: &str) -> StageNode {
        StageNode::steps(name, vec![command.to_string()])
    }

    fn needs(compiled: &CompiledPipeline, id: &str) -> Vec<String> {
        compiled.graph.get(id).unwrap().needs.clone()
    }

    #[test]
    fn test_sequential_chain() {
        let pipeline = Pipeline::new(vec![steps("A", "a"), steps("B", "b"), steps("C", "c")]);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        assert!(needs(&compiled, "a").is_empty());
        assert_eq!(needs(&compiled, "b"), vec!["a"]);
        assert_eq!(needs(&compiled, "c"), vec!["b"]);
        assert!(compiled.diagnostics.is_empty());
    }

    #[test]
    fn test_parallel_fan_out_and_fan_in() {
        let pipeline = Pipeline::new(vec![
            steps("A", "a"),
            StageNode::parallel("P", vec![steps("X", "x"), steps("Y", "y")]),
            steps("D", "d"),
        ]);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        assert_eq!(needs(&compiled, "x"), vec!["a"]);
        assert_eq!(needs(&compiled, "y"), vec!["a"]);
        assert_eq!(needs(&compiled, "d"), vec!["x", "y"]);
        assert!(!compiled.graph.edges().contains(&("x".to_string(), "y".to_string())));
        assert!(compiled.graph.get("p").is_none());
    }

    #[test]
    fn test_nested_parallel_groups() {
        let pipeline = Pipeline::new(vec![
            StageNode::parallel(
                "Outer",
                vec![
                    StageNode::parallel("Inner", vec![steps("I1", "1"), steps("I2", "2")]),
                    steps("O", "o"),
                ],
            ),
            steps("End", "end"),
        ]);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();
        assert_eq!(needs(&compiled, "end"), vec!["i1", "i2", "o"]);
        assert_eq!(compiled.graph.roots(), vec!["i1", "i2", "o"]);
    }

    #[test]
    fn test_environment_diff_against_global() {
        let pipeline = Pipeline::new(vec![steps("Build", "make")
            .with_env("APP", "demo")
            .with_env("REGION", "us")])
        .with_env("APP", "demo")
        .with_env("REGION", "eu");
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        let job = compiled.graph.get("build").unwrap();
        assert_eq!(job.environment.len(), 1);
        assert_eq!(job.environment["REGION"], "us");

        let bundle = &compiled.bundles[0];
        let keys: Vec<_> = bundle.environment.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["APP", "REGION"]);
        assert_eq!(bundle.environment["APP"], "demo");
    }

    #[test]
    fn test_global_docker_agent_is_inherited() {
        let pipeline =
            Pipeline::new(vec![steps("Build", "make")]).with_agent(AgentSpec::docker("node:20"));
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        let job = compiled.graph.get("build").unwrap();
        assert_eq!(job.runs_on, RunTarget::hosted("ubuntu-latest"));
        assert_eq!(job.container.as_ref().map(|c| c.image.as_str()), Some("node:20"));
    }

    #[test]
    fn test_parallel_children_inherit_parent_context() {
        let parent = StageNode::parallel(
            "Deploy",
            vec![steps("EU", "eu").with_env("REGION", "eu"), steps("US", "us")],
        )
        .with_agent(AgentSpec::label("deployer"))
        .with_env("REGION", "default")
        .with_branch("main");
        let child_guarded = StageNode::parallel(
            "Release",
            vec![steps("Tag", "tag").with_branch("release-*")],
        )
        .with_branch("main");

        let pipeline = Pipeline::new(vec![parent, child_guarded]);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        let eu = compiled.graph.get("eu").unwrap();
        assert_eq!(eu.runs_on, RunTarget::self_hosted("deployer"));
        assert_eq!(eu.environment["REGION"], "eu");
        assert_eq!(eu.condition.as_deref(), Some("github.ref == 'refs/heads/main'"));

        let us = compiled.graph.get("us").unwrap();
        assert_eq!(us.environment["REGION"], "default");

        let tag = compiled.graph.get("tag").unwrap();
        assert_eq!(
            tag.condition.as_deref(),
            Some("github.ref == 'refs/heads/main' && startsWith(github.ref, 'refs/heads/release-')")
        );
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let pipeline = Pipeline::new(vec![
            steps("Test", "a"),
            StageNode::parallel("Group", vec![steps("test", "b"), steps("TEST!", "c")]),
        ]);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        let ids: Vec<_> = compiled.graph.jobs().iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["test", "test-2", "test-3"]);
        assert_eq!(
            compiled
                .diagnostics
                .iter()
                .filter(|d| d.code == DiagnosticCode::DuplicateJobId)
                .count(),
            2
        );
    }

    #[test]
    fn test_pipeline_post_needs_every_leaf() {
        let post = PostBlock::new().with(
            PostCondition::Always,
            PostAction {
                commands: vec!["echo done".to_string()],
                ..Default::default()
            },
        );
        let pipeline = Pipeline::new(vec![
            steps("A", "a"),
            StageNode::parallel("P", vec![steps("X", "x"), steps("Y", "y")]),
        ])
        .with_post(post);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        let terminal = compiled.graph.terminal().unwrap();
        assert_eq!(terminal.id, PIPELINE_POST_JOB);
        assert_eq!(terminal.needs, vec!["x", "y"]);
        assert_eq!(terminal.condition.as_deref(), Some("always()"));
        assert_eq!(compiled.graph.leaves(), vec![PIPELINE_POST_JOB]);
    }

    #[test]
    fn test_parallel_post_and_empty_stage_are_reported() {
        let post = PostBlock::new().with(
            PostCondition::Failure,
            PostAction {
                commands: vec!["./alert.sh".to_string()],
                ..Default::default()
            },
        );
        let pipeline = Pipeline::new(vec![
            StageNode::parallel("P", vec![steps("X", "x")]).with_post(post),
            StageNode::steps("Nothing", Vec::new()),
        ]);
        let compiled = JobGraphCompiler::compile(&pipeline).unwrap();

        let codes: Vec<_> = compiled.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::ParallelPostIgnored, DiagnosticCode::EmptyStage]
        );
    }

    #[test]
    fn test_branch_conditions() {
        assert_eq!(
            branch_condition(&BranchGuard::new("main")),
            ("github.ref == 'refs/heads/main'".to_string(), true)
        );
        assert_eq!(
            branch_condition(&BranchGuard::new("release-*")),
            ("startsWith(github.ref, 'refs/heads/release-')".to_string(), true)
        );
        assert_eq!(
            branch_condition(&BranchGuard::new("feature/*/ui")).1,
            false
        );
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(runner_for_label("ubuntu-22.04"), RunTarget::hosted("ubuntu-latest"));
        assert_eq!(runner_for_label("Windows"), RunTarget::hosted("windows-latest"));
        assert_eq!(runner_for_label("mac"), RunTarget::hosted("macos-latest"));
        assert_eq!(runner_for_label("macos-arm"), RunTarget::hosted("macos-latest"));
        assert_eq!(runner_for_label("gpu"), RunTarget::self_hosted("gpu"));
    }
}
