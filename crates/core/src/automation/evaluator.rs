//! Rule evaluation against a freshly stored submission.

use serde::Serialize;

use super::rules::{ActionType, AutomationRule, Condition, ConditionOperator, Notification};
use crate::designer::ElementTree;
use crate::fill::SubmissionValues;
use crate::form::Submission;
use crate::types::DbId;

/// Whether one condition holds.
///
/// Conditions on ids that are not fields of `tree` never match; a present
/// field without a submitted value compares as `""`.
pub fn condition_matches(
    condition: &Condition,
    tree: &ElementTree,
    values: &SubmissionValues,
) -> bool {
    if !tree.contains(&condition.field_id) {
        return false;
    }
    let actual = values
        .get(&condition.field_id)
        .map(String::as_str)
        .unwrap_or("");
    match condition.operator {
        ConditionOperator::Equals => actual == condition.value,
        ConditionOperator::NotEquals => actual != condition.value,
        ConditionOperator::Contains => actual.contains(condition.value.as_str()),
    }
}

/// A rule fires iff every condition holds; no conditions means it always
/// fires.
pub fn rule_matches(rule: &AutomationRule, tree: &ElementTree, values: &SubmissionValues) -> bool {
    rule.conditions
        .iter()
        .all(|c| condition_matches(c, tree, values))
}

/// A rule that fired and the notifications it owes, in action order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredRule {
    pub rule_id: DbId,
    pub rule_name: String,
    pub notifications: Vec<Notification>,
}

/// Evaluate `rules` in order and list what fires for `submission`.
pub fn plan(rules: &[AutomationRule], tree: &ElementTree, submission: &Submission) -> Vec<FiredRule> {
    rules
        .iter()
        .filter(|rule| rule_matches(rule, tree, &submission.data))
        .map(|rule| FiredRule {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            notifications: rule
                .actions
                .iter()
                .map(|action| match action.action_type {
                    ActionType::SendNotification => Notification {
                        rule_id: rule.id,
                        form_id: submission.form_id,
                        submission_id: submission.id,
                        recipient: action.target.clone(),
                        subject: action.payload.subject.clone(),
                        body: action.payload.body.clone(),
                    },
                })
                .collect(),
        })
        .collect()
}
