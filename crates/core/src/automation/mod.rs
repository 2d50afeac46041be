//! Automation rules: conditions over a new submission's values that fire
//! notification actions.

pub mod evaluator;
pub mod rules;

pub use evaluator::{condition_matches, plan, rule_matches, FiredRule};
pub use rules::{
    ActionError, ActionType, AutomationRule, Condition, ConditionOperator, NewAutomationRule,
    Notification, NotificationPayload, RuleAction,
};
