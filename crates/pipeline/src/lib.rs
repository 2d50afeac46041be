//! Async orchestration around the form engine core.
//!
//! - [`SubmissionPipeline`]: validate, persist, complete linked lifecycle
//!   entities, then hand the submission to automation.
//! - [`AutomationRunner`]: best-effort rule evaluation and notification
//!   fan-out; failures are logged and published, never returned.
//! - [`AutosaveController`]: debounced full-tree writes for one designer
//!   session.
//! - [`EditingSession`] / [`SessionRegistry`]: at most one live designer
//!   session per form.

pub mod automation;
pub mod autosave;
pub mod session;
pub mod submission;

pub use automation::{AutomationReport, AutomationRunner};
pub use autosave::{AutosaveConfig, AutosaveController, AutosaveStatus};
pub use session::{EditingSession, SessionRegistry, SessionSnapshot};
pub use submission::SubmissionPipeline;
