//! Repository for the `forms` table.

use formkit_core::types::DbId;
use sqlx::PgPool;

use crate::models::form::FormRow;

/// Column list for `forms` queries.
const COLUMNS: &str = "\
    id, organization_id, title, description, content, is_published, \
    created_at, updated_at";

/// Provides data access for forms.
pub struct FormRepo;

impl FormRepo {
    /// Insert a new, unpublished form with empty content.
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        title: &str,
        description: Option<&str>,
    ) -> Result<FormRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO forms (organization_id, title, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(organization_id)
            .bind(title)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an organization's forms, most recently updated first.
    pub async fn list_by_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<FormRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM forms \
             WHERE organization_id = $1 \
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the whole element tree.
    ///
    /// Returns `None` if the form does not exist.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        content: &serde_json::Value,
    ) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET content = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    /// Set `is_published`. Already published forms keep their
    /// `updated_at`.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<Option<FormRow>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET \
                 updated_at   = CASE WHEN is_published THEN updated_at ELSE now() END, \
                 is_published = true \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
