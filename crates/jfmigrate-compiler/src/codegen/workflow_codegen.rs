//! Workflow generation
//!
//! Assembles the workflow document from the pipeline (triggers, inputs,
//! global environment) and the compiled job graph (jobs, in graph order).

use super::{artifact_step, input_id, notify_step};
use crate::converter::ConverterOptions;
use crate::graph_compiler::CompiledPipeline;
use indexmap::IndexMap;
use jfmigrate_core::workflow::{
    DispatchInput, PullRequestTrigger, PushTrigger, Schedule, Triggers, WorkflowDispatch,
};
use jfmigrate_core::{
    Diagnostic, DiagnosticCode, Extracted, Job, JobAction, JobNode, Needs, ParameterKind,
    Pipeline, PostBlock, Step, Workflow,
};

/// Workflow generator
pub struct WorkflowCodegen;

impl WorkflowCodegen {
    /// Generate the workflow document
    pub fn generate(
        pipeline: &Pipeline,
        compiled: &CompiledPipeline,
        options: &ConverterOptions,
    ) -> Extracted<Workflow> {
        let mut result = Extracted::new(());

        let schedule = pipeline.cron.as_deref().map(|cron| {
            let (normalized, changed) = normalize_cron(cron);
            if changed {
                result.push(Diagnostic::new(
                    DiagnosticCode::ApproximateSchedule,
                    "triggers",
                    format!("cron '{}' rewritten as '{}'", cron, normalized),
                ));
            }
            vec![Schedule { cron: normalized }]
        });

        let on = Triggers {
            push: Some(PushTrigger {
                branches: options.push_branches.clone(),
            }),
            pull_request: Some(PullRequestTrigger {}),
            workflow_dispatch: Self::dispatch(pipeline),
            schedule,
        };

        let jobs: IndexMap<String, Job> = compiled
            .graph
            .jobs()
            .iter()
            .map(|node| (node.id.clone(), Self::job(node, compiled, options)))
            .collect();

        result.map(|_| Workflow {
            name: options.workflow_name.clone(),
            on,
            env: pipeline.environment.clone(),
            jobs,
        })
    }

    fn dispatch(pipeline: &Pipeline) -> Option<WorkflowDispatch> {
        if pipeline.parameters.is_empty() {
            return None;
        }

        let inputs = pipeline
            .parameters
            .iter()
            .map(|param| {
                let options = match &param.kind {
                    ParameterKind::Choice { options } => Some(options.clone()),
                    _ => None,
                };
                let input = DispatchInput {
                    description: param
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("Parameter {}", param.name)),
                    required: false,
                    default: param.default.clone(),
                    input_type: param.kind_name().to_string(),
                    options,
                };
                (param.name.clone(), input)
            })
            .collect();

        Some(WorkflowDispatch { inputs })
    }

    fn job(node: &JobNode, compiled: &CompiledPipeline, options: &ConverterOptions) -> Job {
        let mut steps = vec![Step::uses(options.checkout_action.clone())];

        match &node.action {
            JobAction::Bundle(bundle_id) => {
                let environment = compiled
                    .bundle(bundle_id)
                    .map(|bundle| &bundle.environment)
                    .unwrap_or(&node.environment);
                let call = environment.keys().fold(
                    Step::uses(format!("./{}/{}", options.actions_dir, bundle_id))
                        .named(format!("Run {}", node.name)),
                    |step, key| step.with_input(input_id(key), format!("${{{{ env.{} }}}}", key)),
                );
                steps.push(call);
            }
            JobAction::PipelinePost(post) => steps.extend(Self::pipeline_post_steps(post, options)),
        }

        Job {
            name: Some(node.name.clone()),
            runs_on: node.runs_on.clone(),
            container: node.container.clone(),
            needs: Needs::from_ids(&node.needs),
            condition: node.condition.clone(),
            env: node.environment.clone(),
            steps,
        }
    }

    fn pipeline_post_steps(post: &PostBlock, options: &ConverterOptions) -> Vec<Step> {
        let mut steps = Vec::new();
        for (condition, action) in post.iter() {
            if let Some(path) = &action.archive {
                steps.push(artifact_step(
                    condition,
                    format!("pipeline-{}-artifacts", condition.keyword()),
                    path,
                    options,
                ));
            }
            if !action.commands.is_empty() {
                steps.push(
                    Step::run(action.commands.join("\n"))
                        .named(format!("Pipeline post {}", condition.keyword()))
                        .when(condition.status_function()),
                );
            }
            if let Some(target) = &action.notify {
                steps.push(notify_step(condition, target));
            }
        }
        steps
    }
}

/// Rewrite a Jenkins cron expression for the target scheduler.
///
/// `H` hash tokens become fixed values and `@daily`-style aliases are
/// expanded. Returns the expression and whether it changed.
pub fn normalize_cron(cron: &str) -> (String, bool) {
    let trimmed = cron.trim();
    let alias = match trimmed {
        "@yearly" | "@annually" => Some("0 0 1 1 *"),
        "@monthly" => Some("0 0 1 * *"),
        "@weekly" => Some("0 0 * * 0"),
        "@daily" | "@midnight" => Some("0 0 * * *"),
        "@hourly" => Some("0 * * * *"),
        _ => None,
    };
    if let Some(expanded) = alias {
        return (expanded.to_string(), true);
    }

    let fields: Vec<String> = trimmed
        .split_whitespace()
        .enumerate()
        .map(|(position, field)| normalize_field(field, position))
        .collect();
    let normalized = fields.join(" ");
    let changed = normalized != trimmed;
    (normalized, changed)
}

/// `H` -> lowest value of the field, `H/n` -> `*/n`, `H(a-b)` -> `a`,
/// `H(a-b)/n` -> `a-b/n`
fn normalize_field(field: &str, position: usize) -> String {
    let Some(rest) = field.strip_prefix('H') else {
        return field.to_string();
    };

    if let Some(range) = rest.strip_prefix('(') {
        if let Some((bounds, step)) = range.split_once(')') {
            return match step.strip_prefix('/') {
                Some(step) => format!("{}/{}", bounds, step),
                None => bounds.split('-').next().unwrap_or(bounds).to_string(),
            };
        }
    }

    match rest.strip_prefix('/') {
        Some(step) => format!("*/{}", step),
        // day-of-month and month start at 1
        None if position == 2 || position == 3 => "1".to_string(),
        None => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_compiler::JobGraphCompiler;
    use jfmigrate_core::{ParameterSpec, ParameterValue, PostAction, PostCondition, StageNode};

    fn generate(pipeline: &Pipeline) -> Workflow {
        let compiled = JobGraphCompiler::compile(pipeline).unwrap();
        WorkflowCodegen::generate(pipeline, &compiled, &ConverterOptions::default()).value
    }

    #[test]
    fn test_triggers_and_inputs() {
        let pipeline = Pipeline::new(vec![StageNode::steps("Build", vec!["make".into()])])
            .with_parameter(ParameterSpec::boolean("RUN_TESTS", true))
            .with_parameter(ParameterSpec::choice(
                "TARGET",
                vec!["dev".into(), "prod".into()],
            ))
            .with_cron("0 4 * * *");
        let workflow = generate(&pipeline);

        assert_eq!(workflow.name, "CI");
        assert_eq!(
            workflow.on.push.as_ref().map(|push| push.branches.clone()),
            Some(vec!["main".to_string(), "master".to_string()])
        );
        assert!(workflow.on.pull_request.is_some());
        assert_eq!(
            workflow.on.schedule,
            Some(vec![Schedule {
                cron: "0 4 * * *".to_string()
            }])
        );

        let inputs = &workflow.on.workflow_dispatch.as_ref().unwrap().inputs;
        assert_eq!(inputs["RUN_TESTS"].input_type, "boolean");
        assert_eq!(inputs["RUN_TESTS"].default, ParameterValue::Bool(true));
        assert_eq!(inputs["RUN_TESTS"].description, "Parameter RUN_TESTS");
        assert_eq!(
            inputs["TARGET"].options,
            Some(vec!["dev".to_string(), "prod".to_string()])
        );
    }

    #[test]
    fn test_no_dispatch_without_parameters() {
        let workflow = generate(&Pipeline::new(vec![StageNode::steps("A", vec!["a".into()])]));
        assert!(workflow.on.workflow_dispatch.is_none());
        assert!(workflow.on.schedule.is_none());
    }

    #[test]
    fn test_job_steps_call_bundles() {
        let pipeline = Pipeline::new(vec![
            StageNode::steps("Build", vec!["make".into()]),
            StageNode::steps("Deploy", vec!["./deploy.sh".into()]).with_env("DEPLOY_ENV", "prod"),
        ]);
        let workflow = generate(&pipeline);

        let deploy = &workflow.jobs["deploy"];
        assert_eq!(deploy.needs, Some(Needs::One("build".to_string())));
        assert_eq!(deploy.steps[0].uses.as_deref(), Some("actions/checkout@v4"));
        assert_eq!(deploy.steps[1].uses.as_deref(), Some("./.github/actions/deploy"));
        assert_eq!(
            deploy.steps[1].with.get("deploy-env").map(String::as_str),
            Some("${{ env.DEPLOY_ENV }}")
        );
        assert_eq!(deploy.env["DEPLOY_ENV"], "prod");
    }

    #[test]
    fn test_pipeline_post_job() {
        let post = PostBlock::new()
            .with(
                PostCondition::Always,
                PostAction {
                    archive: Some("dist/**".into()),
                    commands: vec!["echo one".into(), "echo two".into()],
                    ..Default::default()
                },
            )
            .with(
                PostCondition::Failure,
                PostAction {
                    notify: Some("ops@example.com".into()),
                    ..Default::default()
                },
            );
        let pipeline = Pipeline::new(vec![
            StageNode::parallel(
                "Checks",
                vec![
                    StageNode::steps("Lint", vec!["lint".into()]),
                    StageNode::steps("Test", vec!["test".into()]),
                ],
            ),
        ])
        .with_post(post);
        let workflow = generate(&pipeline);

        let job = &workflow.jobs["pipeline-post"];
        assert_eq!(
            job.needs,
            Some(Needs::Many(vec!["lint".to_string(), "test".to_string()]))
        );
        assert_eq!(job.condition.as_deref(), Some("always()"));

        let names: Vec<_> = job.steps.iter().map(|s| s.name.as_deref()).collect();
        assert_eq!(
            names,
            vec![
                None,
                Some("Upload artifacts (always)"),
                Some("Pipeline post always"),
                Some("Notify on failure"),
            ]
        );
        assert_eq!(
            job.steps[1].with.get("name").map(String::as_str),
            Some("pipeline-always-artifacts")
        );
        assert_eq!(job.steps[2].run.as_deref(), Some("echo one\necho two"));
        assert_eq!(job.steps[3].condition.as_deref(), Some("failure()"));
    }

    #[test]
    fn test_normalize_cron() {
        assert_eq!(normalize_cron("0 4 * * *"), ("0 4 * * *".to_string(), false));
        assert_eq!(normalize_cron("H 2 * * 1-5"), ("0 2 * * 1-5".to_string(), true));
        assert_eq!(normalize_cron("H/15 * * * *"), ("*/15 * * * *".to_string(), true));
        assert_eq!(normalize_cron("H(0-29) H H * *"), ("0 0 1 * *".to_string(), true));
        assert_eq!(normalize_cron("H(0-29)/10 * * * *"), ("0-29/10 * * * *".to_string(), true));
        assert_eq!(normalize_cron("@daily"), ("0 0 * * *".to_string(), true));
    }
}
