//! Code generation module
//!
//! This module turns the compiled job graph into output documents:
//! - [`BundleCodegen`]: one composite action per step bundle
//! - [`WorkflowCodegen`]: the workflow calling those actions

pub mod bundle_codegen;
pub mod workflow_codegen;

pub use bundle_codegen::{input_id, BundleCodegen};
pub use workflow_codegen::{normalize_cron, WorkflowCodegen};

use crate::converter::ConverterOptions;
use jfmigrate_core::{PostCondition, Step};

/// Upload step for an archived artifact glob
pub(crate) fn artifact_step(
    condition: PostCondition,
    artifact_name: String,
    path: &str,
    options: &ConverterOptions,
) -> Step {
    Step::uses(options.upload_artifact_action.clone())
        .named(format!("Upload artifacts ({})", condition.keyword()))
        .when(condition.status_function())
        .with_input("name", artifact_name)
        .with_input("path", path)
}

/// Placeholder for a `mail to:` notification
pub(crate) fn notify_step(condition: PostCondition, target: &str) -> Step {
    Step::run(format!("echo \"Replace with mail action to: {}\"", target))
        .named(format!("Notify on {}", condition.keyword()))
        .when(condition.status_function())
}
