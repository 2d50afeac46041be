//! Repository for the `automation_rules` table.

use formkit_core::types::DbId;
use sqlx::PgPool;

use crate::models::automation_rule::AutomationRuleRow;

/// Column list for `automation_rules` queries.
const COLUMNS: &str = "id, form_id, name, conditions, actions, created_at";

/// Provides data access for automation rules.
pub struct AutomationRuleRepo;

impl AutomationRuleRepo {
    pub async fn create(
        pool: &PgPool,
        form_id: DbId,
        name: &str,
        conditions: &serde_json::Value,
        actions: &serde_json::Value,
    ) -> Result<AutomationRuleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO automation_rules (form_id, name, conditions, actions) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AutomationRuleRow>(&query)
            .bind(form_id)
            .bind(name)
            .bind(conditions)
            .bind(actions)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AutomationRuleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM automation_rules WHERE id = $1");
        sqlx::query_as::<_, AutomationRuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a form's rules in creation order (the order they are evaluated).
    pub async fn list_by_form(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<AutomationRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM automation_rules WHERE form_id = $1 ORDER BY id ASC"
        );
        sqlx::query_as::<_, AutomationRuleRow>(&query)
            .bind(form_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM automation_rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
