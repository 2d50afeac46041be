//! Submission row model.

use formkit_core::error::CoreError;
use formkit_core::form::Submission;
use formkit_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `form_submissions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionRow {
    pub id: DbId,
    pub form_id: DbId,
    pub data: serde_json::Value,
    pub task_id: Option<DbId>,
    pub assignment_id: Option<DbId>,
    pub visit_id: Option<DbId>,
    pub created_at: Timestamp,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = CoreError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let data = serde_json::from_value(row.data).map_err(|e| {
            CoreError::Internal(format!("Stored data of submission {} is invalid: {e}", row.id))
        })?;
        Ok(Submission {
            id: row.id,
            form_id: row.form_id,
            data,
            task_id: row.task_id,
            assignment_id: row.assignment_id,
            visit_id: row.visit_id,
            created_at: row.created_at,
        })
    }
}
