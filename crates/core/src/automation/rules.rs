//! Automation rule, condition and action types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::designer::ElementTree;
use crate::error::CoreError;
use crate::types::{DbId, FieldId, Timestamp};

/// Maximum number of conditions on one rule.
pub const MAX_CONDITIONS: usize = 20;

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
        }
    }
}

impl FromStr for ConditionOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equals" => Ok(Self::Equals),
            "not_equals" => Ok(Self::NotEquals),
            "contains" => Ok(Self::Contains),
            _ => Err(CoreError::Validation(format!(
                "Invalid operator: '{s}'. Must be one of: equals, not_equals, contains"
            ))),
        }
    }
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `value(field_id) <operator> value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Condition {
    #[validate(length(min = 1, max = 100))]
    pub field_id: FieldId,
    pub operator: ConditionOperator,
    #[validate(length(max = 500))]
    pub value: String,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SendNotification,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendNotification => "send_notification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub subject: String,
    pub body: String,
}

/// One action of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Fixed recipient: an email address, a webhook URL or an in-app user
    /// handle.
    pub target: String,
    pub payload: NotificationPayload,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A stored automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: DbId,
    pub form_id: DbId,
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<RuleAction>,
    pub created_at: Timestamp,
}

/// Authoring input: a name, zero or more conditions and the recipient of
/// the single notification action.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAutomationRule {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub conditions: Vec<Condition>,
    #[validate(length(min = 1, max = 320))]
    pub recipient: String,
}

impl NewAutomationRule {
    /// Check the input against the form's current tree and build the
    /// conditions and actions to store.
    pub fn check(&self, tree: &ElementTree) -> Result<(Vec<Condition>, Vec<RuleAction>), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name must not be blank".to_string()));
        }
        if self.recipient.trim().is_empty() {
            return Err(CoreError::Validation(
                "recipient must not be blank".to_string(),
            ));
        }
        if self.conditions.len() > MAX_CONDITIONS {
            return Err(CoreError::Validation(format!(
                "A rule may have at most {MAX_CONDITIONS} conditions, got {}",
                self.conditions.len()
            )));
        }
        for condition in &self.conditions {
            if !tree.contains(&condition.field_id) {
                return Err(CoreError::Validation(format!(
                    "Condition references unknown field '{}'",
                    condition.field_id
                )));
            }
        }
        let action = RuleAction {
            action_type: ActionType::SendNotification,
            target: self.recipient.trim().to_string(),
            payload: self.payload(tree),
        };
        Ok((self.conditions.clone(), vec![action]))
    }

    /// Notification text derived from the rule name and its conditions.
    fn payload(&self, tree: &ElementTree) -> NotificationPayload {
        let name = self.name.trim();
        let body = if self.conditions.is_empty() {
            format!("Rule \"{name}\" fired for a new submission.")
        } else {
            let clauses: Vec<String> = self
                .conditions
                .iter()
                .map(|c| {
                    let label = tree
                        .get(&c.field_id)
                        .map(|f| f.display_label())
                        .unwrap_or_else(|| c.field_id.clone());
                    format!("{label} {} \"{}\"", c.operator.as_str().replace('_', " "), c.value)
                })
                .collect();
            format!(
                "Rule \"{name}\" fired for a new submission where {}.",
                clauses.join(" and ")
            )
        };
        NotificationPayload {
            subject: format!("Automation: {name}"),
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A concrete notification produced by a fired rule for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub rule_id: DbId,
    pub form_id: DbId,
    pub submission_id: DbId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Failure of one automation action. Contained per action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Delivery to '{recipient}' failed: {reason}")]
    Delivery { recipient: String, reason: String },

    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{registry, FieldType};

    fn tree() -> ElementTree {
        let mut field = registry::construct(FieldType::TextField, "f1");
        field
            .extra_attributes
            .insert("label".to_string(), serde_json::json!("Priority"));
        ElementTree::from_elements(vec![field]).unwrap()
    }

    fn input(conditions: Vec<Condition>) -> NewAutomationRule {
        NewAutomationRule {
            name: "Escalate".to_string(),
            conditions,
            recipient: "ops@example.com".to_string(),
        }
    }

    fn cond(field_id: &str, operator: ConditionOperator, value: &str) -> Condition {
        Condition {
            field_id: field_id.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    #[test]
    fn builds_single_notification_action() {
        let (conditions, actions) = input(vec![cond("f1", ConditionOperator::Equals, "urgent")])
            .check(&tree())
            .unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::SendNotification);
        assert_eq!(actions[0].target, "ops@example.com");
        assert_eq!(actions[0].payload.subject, "Automation: Escalate");
        assert!(actions[0].payload.body.contains("Priority equals \"urgent\""));
    }

    #[test]
    fn rejects_unknown_field_reference() {
        let err = input(vec![cond("gone", ConditionOperator::Equals, "x")])
            .check(&tree())
            .unwrap_err();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn rejects_blank_name() {
        let mut rule = input(Vec::new());
        rule.name = "  ".to_string();
        assert!(rule.check(&tree()).is_err());
    }

    #[test]
    fn empty_conditions_allowed() {
        let (conditions, actions) = input(Vec::new()).check(&tree()).unwrap();
        assert!(conditions.is_empty());
        assert!(actions[0].payload.body.contains("fired for a new submission."));
    }

    #[test]
    fn operator_wire_names() {
        let c: Condition = serde_json::from_value(serde_json::json!({
            "field_id": "f1", "operator": "not_equals", "value": "x"
        }))
        .unwrap();
        assert_eq!(c.operator, ConditionOperator::NotEquals);
        assert!("matches".parse::<ConditionOperator>().is_err());
        assert_eq!(
            "not_equals".parse::<ConditionOperator>().unwrap(),
            ConditionOperator::NotEquals
        );
        let action = serde_json::to_value(RuleAction {
            action_type: ActionType::SendNotification,
            target: "t".to_string(),
            payload: NotificationPayload {
                subject: "s".to_string(),
                body: "b".to_string(),
            },
        })
        .unwrap();
        assert_eq!(action["type"], "send_notification");
    }
}
