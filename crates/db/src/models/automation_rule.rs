//! Automation rule row model. Conditions and actions are stored as JSONB
//! arrays in their wire format.

use formkit_core::automation::AutomationRule;
use formkit_core::error::CoreError;
use formkit_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `automation_rules` table.
#[derive(Debug, Clone, FromRow)]
pub struct AutomationRuleRow {
    pub id: DbId,
    pub form_id: DbId,
    pub name: String,
    pub conditions: serde_json::Value,
    pub actions: serde_json::Value,
    pub created_at: Timestamp,
}

impl TryFrom<AutomationRuleRow> for AutomationRule {
    type Error = CoreError;

    fn try_from(row: AutomationRuleRow) -> Result<Self, Self::Error> {
        let invalid =
            |e: serde_json::Error| CoreError::Internal(format!("Rule {} is invalid: {e}", row.id));
        let conditions = serde_json::from_value(row.conditions.clone()).map_err(invalid)?;
        let actions = serde_json::from_value(row.actions.clone()).map_err(invalid)?;
        Ok(AutomationRule {
            id: row.id,
            form_id: row.form_id,
            name: row.name,
            conditions,
            actions,
            created_at: row.created_at,
        })
    }
}
