//! Repository for the `form_submissions` table.

use formkit_core::fill::SubmissionLinkage;
use formkit_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::SubmissionRow;

/// Column list for `form_submissions` queries.
const COLUMNS: &str = "\
    id, form_id, data, task_id, assignment_id, visit_id, created_at";

/// Provides data access for submissions. Rows are insert-only.
pub struct SubmissionRepo;

impl SubmissionRepo {
    pub async fn create(
        pool: &PgPool,
        form_id: DbId,
        data: &serde_json::Value,
        linkage: SubmissionLinkage,
    ) -> Result<SubmissionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_submissions (form_id, data, task_id, assignment_id, visit_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(form_id)
            .bind(data)
            .bind(linkage.task_id)
            .bind(linkage.assignment_id)
            .bind(linkage.visit_id)
            .fetch_one(pool)
            .await
    }

    /// List a form's submissions, newest first.
    pub async fn list_by_form(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<SubmissionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_submissions \
             WHERE form_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SubmissionRow>(&query)
            .bind(form_id)
            .fetch_all(pool)
            .await
    }
}
