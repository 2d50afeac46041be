//! Form row model.

use formkit_core::designer::ElementTree;
use formkit_core::error::CoreError;
use formkit_core::form::FormDefinition;
use formkit_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `forms` table.
#[derive(Debug, Clone, FromRow)]
pub struct FormRow {
    pub id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub content: serde_json::Value,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<FormRow> for FormDefinition {
    type Error = CoreError;

    /// Stored content is re-checked on load; a row that no longer parses
    /// is reported rather than served.
    fn try_from(row: FormRow) -> Result<Self, Self::Error> {
        let content = ElementTree::from_json(&row.content).map_err(|e| {
            CoreError::Internal(format!("Stored content of form {} is invalid: {e}", row.id))
        })?;
        Ok(FormDefinition {
            id: row.id,
            organization_id: row.organization_id,
            title: row.title,
            description: row.description,
            content,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
