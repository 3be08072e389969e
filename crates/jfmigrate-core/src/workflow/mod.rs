//! Workflow documents
//!
//! Serializable GitHub Actions documents produced by the compiler:
//! - [`Workflow`]: `.github/workflows/<name>.yml`
//! - [`CompositeAction`]: `.github/actions/<bundle>/action.yml`
//!
//! Both deserialize as well, so a written workflow can be read back and its
//! job graph re-extracted.

pub mod action;
pub mod document;
pub mod step;

pub use action::{ActionInput, CompositeAction, CompositeRuns};
pub use document::{
    DispatchInput, Job, Needs, PullRequestTrigger, PushTrigger, Schedule, Triggers, Workflow,
    WorkflowDispatch,
};
pub use step::Step;
