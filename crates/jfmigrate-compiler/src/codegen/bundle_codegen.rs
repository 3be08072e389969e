//! Composite action generation
//!
//! Each step bundle becomes `<actions-dir>/<bundle-id>/action.yml`:
//! - one input per environment key, defaulting to the declared value
//! - one `run` step per command, with the inputs exposed as environment
//! - the stage's post hooks, guarded by status functions

use super::{artifact_step, notify_step};
use crate::converter::ConverterOptions;
use crate::slug::sanitize_name;
use jfmigrate_core::workflow::ActionInput;
use jfmigrate_core::{CompositeAction, Step, StepBundle};

const SHELL: &str = "bash";

/// Input id of an environment key (`DEPLOY_ENV` -> `deploy-env`)
pub fn input_id(key: &str) -> String {
    key.to_lowercase().replace('_', "-")
}

/// Composite action generator
pub struct BundleCodegen;

impl BundleCodegen {
    /// Generate the composite action of a bundle
    pub fn generate(bundle: &StepBundle, options: &ConverterOptions) -> CompositeAction {
        let mut action = CompositeAction::new(
            format!("{} Action", bundle.stage_name),
            format!("Composite action for {} stage", bundle.stage_name),
        );

        for (key, value) in &bundle.environment {
            action.inputs.insert(
                input_id(key),
                ActionInput {
                    description: format!("Environment variable {}", key),
                    required: false,
                    default: value.clone(),
                },
            );
        }

        let mut steps: Vec<Step> = bundle
            .commands
            .iter()
            .enumerate()
            .map(|(index, command)| {
                bundle.environment.keys().fold(
                    Step::run(command.clone())
                        .named(format!("Run command {}", index + 1))
                        .in_shell(SHELL),
                    |step, key| step.with_env(key.clone(), format!("${{{{ inputs.{} }}}}", input_id(key))),
                )
            })
            .collect();

        if let Some(post) = &bundle.post {
            let artifact_base = sanitize_name(&bundle.stage_name);
            for (condition, post_action) in post.iter() {
                if let Some(path) = &post_action.archive {
                    steps.push(artifact_step(
                        condition,
                        format!("{}-{}-artifacts", artifact_base, condition.keyword()),
                        path,
                        options,
                    ));
                }
                for command in &post_action.commands {
                    steps.push(
                        Step::run(command.clone())
                            .named(format!("Post {}", condition.keyword()))
                            .when(condition.status_function())
                            .in_shell(SHELL),
                    );
                }
                if let Some(target) = &post_action.notify {
                    steps.push(notify_step(condition, target).in_shell(SHELL));
                }
            }
        }

        if steps.is_empty() {
            steps.push(
                Step::run(format!("echo \"Stage '{}' has no steps\"", bundle.stage_name))
                    .named("Placeholder")
                    .in_shell(SHELL),
            );
        }

        action.runs.steps = steps;
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jfmigrate_core::{PostAction, PostBlock, PostCondition};

    fn options() -> ConverterOptions {
        ConverterOptions::default()
    }

    #[test]
    fn test_one_step_per_command() {
        let bundle = StepBundle::new("build", "Build", vec!["make".into(), "make dist".into()]);
        let action = BundleCodegen::generate(&bundle, &options());

        assert_eq!(action.name, "Build Action");
        assert_eq!(action.runs.using, "composite");
        assert_eq!(action.steps().len(), 2);
        assert_eq!(action.steps()[0].run.as_deref(), Some("make"));
        assert_eq!(action.steps()[0].shell.as_deref(), Some("bash"));
        assert_eq!(action.steps()[1].name.as_deref(), Some("Run command 2"));
        assert!(action.inputs.is_empty());
    }

    #[test]
    fn test_environment_becomes_inputs() {
        let mut bundle = StepBundle::new("deploy", "Deploy", vec!["./deploy.sh".into()]);
        bundle.environment.insert("DEPLOY_ENV".into(), "staging".into());

        let action = BundleCodegen::generate(&bundle, &options());
        let input = &action.inputs["deploy-env"];
        assert_eq!(input.default, "staging");
        assert!(!input.required);
        assert_eq!(
            action.steps()[0].env.get("DEPLOY_ENV").map(String::as_str),
            Some("${{ inputs.deploy-env }}")
        );
    }

    #[test]
    fn test_post_steps_are_guarded() {
        let post = PostBlock::new()
            .with(
                PostCondition::Cleanup,
                PostAction {
                    commands: vec!["rm -rf tmp".into()],
                    ..Default::default()
                },
            )
            .with(
                PostCondition::Always,
                PostAction {
                    archive: Some("out/**".into()),
                    notify: Some("dev@example.com".into()),
                    ..Default::default()
                },
            );
        let mut bundle = StepBundle::new("unit-tests", "Unit Tests", vec!["make test".into()]);
        bundle.post = Some(post);

        let steps = BundleCodegen::generate(&bundle, &options()).runs.steps;
        assert_eq!(steps.len(), 4);

        assert_eq!(steps[1].uses.as_deref(), Some("actions/upload-artifact@v4"));
        assert_eq!(steps[1].condition.as_deref(), Some("always()"));
        assert_eq!(
            steps[1].with.get("name").map(String::as_str),
            Some("Unit_Tests-always-artifacts")
        );
        assert_eq!(steps[2].name.as_deref(), Some("Notify on always"));
        assert_eq!(steps[3].run.as_deref(), Some("rm -rf tmp"));
        assert_eq!(steps[3].condition.as_deref(), Some("always()"));
    }

    #[test]
    fn test_empty_bundle_gets_placeholder() {
        let bundle = StepBundle::new("noop", "Noop", Vec::new());
        let action = BundleCodegen::generate(&bundle, &options());
        assert_eq!(action.steps().len(), 1);
        assert_eq!(action.steps()[0].name.as_deref(), Some("Placeholder"));
    }
}
