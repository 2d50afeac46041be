//! Automation fan-out for a stored submission.
//!
//! Runs after the submission is committed. Nothing here can fail the
//! submission: rule lookup errors, delivery errors and even panics inside a
//! notifier are contained per action, logged, and published as
//! `automation.action_failed`.

use std::sync::Arc;

use formkit_core::automation::{self, Notification};
use formkit_core::designer::ElementTree;
use formkit_core::form::Submission;
use formkit_core::store::{FormStore, Notifier};
use formkit_events::bus::{EVENT_ACTION_FAILED, EVENT_RULE_FIRED};
use formkit_events::{EventBus, FormEvent};
use serde::Serialize;

/// Counts from one automation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutomationReport {
    pub rules_evaluated: usize,
    pub rules_fired: usize,
    pub actions_sent: usize,
    pub actions_failed: usize,
}

pub struct AutomationRunner {
    store: Arc<dyn FormStore>,
    notifier: Arc<dyn Notifier>,
    bus: Arc<EventBus>,
}

impl AutomationRunner {
    pub fn new(store: Arc<dyn FormStore>, notifier: Arc<dyn Notifier>, bus: Arc<EventBus>) -> Self {
        Self {
            store,
            notifier,
            bus,
        }
    }

    /// Evaluate the form's rules against `submission` and execute the
    /// actions of every rule that fires, in order.
    pub async fn run(&self, tree: &ElementTree, submission: &Submission) -> AutomationReport {
        let mut report = AutomationReport::default();

        let rules = match self.store.list_rules(submission.form_id).await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(
                    form_id = submission.form_id,
                    submission_id = submission.id,
                    error = %e,
                    "Automation: failed to load rules"
                );
                self.bus.publish(
                    FormEvent::new(EVENT_ACTION_FAILED)
                        .with_form(submission.form_id)
                        .with_payload(serde_json::json!({
                            "submission_id": submission.id,
                            "error": e.to_string(),
                        })),
                );
                return report;
            }
        };
        report.rules_evaluated = rules.len();

        for fired in automation::plan(&rules, tree, submission) {
            report.rules_fired += 1;
            tracing::info!(
                form_id = submission.form_id,
                submission_id = submission.id,
                rule_id = fired.rule_id,
                "Automation rule fired"
            );
            self.bus.publish(
                FormEvent::new(EVENT_RULE_FIRED)
                    .with_form(submission.form_id)
                    .with_payload(serde_json::json!({
                        "rule_id": fired.rule_id,
                        "rule_name": fired.rule_name,
                        "submission_id": submission.id,
                    })),
            );

            for notification in fired.notifications {
                match self.execute(notification.clone()).await {
                    Ok(()) => report.actions_sent += 1,
                    Err(error) => {
                        report.actions_failed += 1;
                        tracing::warn!(
                            rule_id = notification.rule_id,
                            submission_id = notification.submission_id,
                            recipient = %notification.recipient,
                            error = %error,
                            "Automation action failed"
                        );
                        self.bus.publish(
                            FormEvent::new(EVENT_ACTION_FAILED)
                                .with_form(notification.form_id)
                                .with_payload(serde_json::json!({
                                    "rule_id": notification.rule_id,
                                    "submission_id": notification.submission_id,
                                    "recipient": notification.recipient,
                                    "error": error,
                                })),
                        );
                    }
                }
            }
        }

        report
    }

    /// Run one action on its own task so a panicking notifier only takes
    /// down that action.
    async fn execute(&self, notification: Notification) -> Result<(), String> {
        let notifier = Arc::clone(&self.notifier);
        let handle = tokio::spawn(async move { notifier.send(&notification).await });
        match handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_err) => Err(format!("action task aborted: {join_err}")),
        }
    }
}
