//! Form definitions, submissions and the lifecycle updates a submission
//! triggers.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::designer::ElementTree;
use crate::error::CoreError;
use crate::fill::{SubmissionLinkage, SubmissionValues};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Form definition
// ---------------------------------------------------------------------------

/// A form and its designed content.
///
/// Created unpublished; publishing is one-way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub content: ElementTree,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FormDefinition {
    /// Reject anonymous access to a form that is not published.
    pub fn ensure_published(&self) -> Result<(), CoreError> {
        if self.is_published {
            Ok(())
        } else {
            Err(CoreError::NotPublished(self.id))
        }
    }
}

/// Input for creating a form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewForm {
    pub organization_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl NewForm {
    /// Field-level checks plus a non-blank title.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be blank".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// One accepted fill of a published form. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: DbId,
    pub form_id: DbId,
    pub data: SubmissionValues,
    pub task_id: Option<DbId>,
    pub assignment_id: Option<DbId>,
    pub visit_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl Submission {
    pub fn linkage(&self) -> SubmissionLinkage {
        SubmissionLinkage {
            task_id: self.task_id,
            assignment_id: self.assignment_id,
            visit_id: self.visit_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

pub const STATUS_DONE: &str = "done";
pub const STATUS_COMPLETED: &str = "completed";

/// Externally owned entity a submission can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleKind {
    Task,
    Assignment,
    Visit,
}

impl LifecycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Assignment => "assignment",
            Self::Visit => "visit",
        }
    }
}

impl std::fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status change to apply to a lifecycle entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleUpdate {
    pub kind: LifecycleKind,
    pub id: DbId,
    pub status: &'static str,
    pub completed_at: Option<Timestamp>,
}

impl SubmissionLinkage {
    /// Status changes owed for this linkage, in application order.
    ///
    /// A task takes precedence over an assignment (only one of them is
    /// completed); a visit is completed independently.
    pub fn lifecycle_updates(&self, now: Timestamp) -> Vec<LifecycleUpdate> {
        let mut updates = Vec::new();
        if let Some(id) = self.task_id {
            updates.push(LifecycleUpdate {
                kind: LifecycleKind::Task,
                id,
                status: STATUS_DONE,
                completed_at: None,
            });
        } else if let Some(id) = self.assignment_id {
            updates.push(LifecycleUpdate {
                kind: LifecycleKind::Assignment,
                id,
                status: STATUS_COMPLETED,
                completed_at: Some(now),
            });
        }
        if let Some(id) = self.visit_id {
            updates.push(LifecycleUpdate {
                kind: LifecycleKind::Visit,
                id,
                status: STATUS_COMPLETED,
                completed_at: None,
            });
        }
        updates
    }
}
