//! The submission pipeline.
//!
//! Order matters: the form must be published, linkage ids must parse and
//! every field must validate before anything is written. Once the submission
//! row exists, linked lifecycle entities are completed (task before
//! assignment, visit independently), `submission.created` is published and
//! automation is handed off to a tracked background task. Neither lifecycle
//! failures nor automation affect the caller's result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use formkit_core::error::CoreError;
use formkit_core::fill::{SubmissionLinkage, SubmissionValues};
use formkit_core::form::{LifecycleUpdate, Submission};
use formkit_core::store::FormStore;
use formkit_core::types::DbId;
use formkit_core::validation::validate_submission;
use formkit_events::bus::{EVENT_LIFECYCLE_FAILED, EVENT_SUBMISSION_CREATED};
use formkit_events::{EventBus, FormEvent};
use tokio_util::task::TaskTracker;

use crate::automation::AutomationRunner;

pub struct SubmissionPipeline {
    store: Arc<dyn FormStore>,
    automation: Arc<AutomationRunner>,
    bus: Arc<EventBus>,
    tracker: TaskTracker,
}

impl SubmissionPipeline {
    pub fn new(store: Arc<dyn FormStore>, automation: AutomationRunner, bus: Arc<EventBus>) -> Self {
        Self {
            store,
            automation: Arc::new(automation),
            bus,
            tracker: TaskTracker::new(),
        }
    }

    /// Accept a filler's values for `form_id`.
    ///
    /// Returns [`CoreError::NotPublished`] for draft forms and
    /// [`CoreError::FieldValidation`] listing every failing field. Once the
    /// submission is stored the call succeeds: lifecycle failures are
    /// reported as `submission.lifecycle_failed` events.
    pub async fn submit(
        &self,
        form_id: DbId,
        values: SubmissionValues,
    ) -> Result<Submission, CoreError> {
        let form = self.store.get_form(form_id).await?;
        form.ensure_published()?;

        let linkage = SubmissionLinkage::from_values(&values)?;

        let result = validate_submission(&form.content, &values);
        if !result.is_valid {
            tracing::debug!(
                form_id,
                failing = result.errors.len(),
                "Submission rejected by validation"
            );
            return Err(CoreError::FieldValidation(result.errors));
        }

        let submission = self.store.create_submission(form_id, &values, linkage).await?;
        tracing::info!(
            form_id,
            submission_id = submission.id,
            task_id = ?linkage.task_id,
            assignment_id = ?linkage.assignment_id,
            visit_id = ?linkage.visit_id,
            "Submission stored"
        );

        for update in linkage.lifecycle_updates(Utc::now()) {
            self.apply_lifecycle(&submission, &update).await;
        }

        self.bus.publish(
            FormEvent::new(EVENT_SUBMISSION_CREATED)
                .with_form(form_id)
                .with_payload(serde_json::json!({
                    "submission_id": submission.id,
                    "task_id": linkage.task_id,
                    "assignment_id": linkage.assignment_id,
                    "visit_id": linkage.visit_id,
                })),
        );

        let runner = Arc::clone(&self.automation);
        let tree = form.content;
        let stored = submission.clone();
        self.tracker.spawn(async move {
            let report = runner.run(&tree, &stored).await;
            tracing::debug!(
                submission_id = stored.id,
                rules_fired = report.rules_fired,
                actions_failed = report.actions_failed,
                "Automation finished"
            );
        });

        Ok(submission)
    }

    /// Complete one linked entity. Failures are reported on the bus and do
    /// not affect the stored submission or the remaining updates.
    async fn apply_lifecycle(&self, submission: &Submission, update: &LifecycleUpdate) {
        let Err(e) = self.store.update_lifecycle_entity(update).await else {
            return;
        };
        tracing::warn!(
            submission_id = submission.id,
            kind = %update.kind,
            entity_id = update.id,
            error = %e,
            "Lifecycle update failed"
        );
        self.bus.publish(
            FormEvent::new(EVENT_LIFECYCLE_FAILED)
                .with_form(submission.form_id)
                .with_payload(serde_json::json!({
                    "submission_id": submission.id,
                    "kind": update.kind,
                    "entity_id": update.id,
                    "error": e.to_string(),
                })),
        );
    }

    /// Automation tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Stop accepting automation work and wait up to `timeout` for running
    /// tasks. Returns `false` if the timeout elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok();
        if !drained {
            tracing::warn!(
                remaining = self.tracker.len(),
                "Automation tasks still running at shutdown"
            );
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use formkit_core::automation::{ActionError, Condition, ConditionOperator, NewAutomationRule, Notification};
    use formkit_core::designer::ElementTree;
    use formkit_core::fields::{registry, FieldInstance, FieldType};
    use formkit_core::form::{LifecycleKind, NewForm, STATUS_COMPLETED, STATUS_DONE};
    use formkit_core::store::Notifier;
    use formkit_db::{FailPoint, MemoryFormStore};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, n: &Notification) -> Result<(), ActionError> {
            if self.fail {
                return Err(ActionError::Unavailable("offline".to_string()));
            }
            self.sent.lock().await.push(n.clone());
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryFormStore>,
        notifier: Arc<RecordingNotifier>,
        pipeline: SubmissionPipeline,
        bus: Arc<EventBus>,
        form_id: DbId,
    }

    fn required_text(id: &str) -> FieldInstance {
        let mut field = registry::construct(FieldType::TextField, id);
        field
            .extra_attributes
            .insert("required".to_string(), serde_json::json!(true));
        field
    }

    /// f1: required text, f2: optional number.
    async fn fixture(publish: bool, notifier: RecordingNotifier) -> Fixture {
        let store = Arc::new(MemoryFormStore::new());
        let form = store
            .create_form(&NewForm {
                organization_id: 1,
                title: "Inspection".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let tree = ElementTree::from_elements(vec![
            required_text("f1"),
            registry::construct(FieldType::NumberField, "f2"),
        ])
        .unwrap();
        store.update_form_content(form.id, &tree).await.unwrap();
        if publish {
            store.publish_form(form.id).await.unwrap();
        }

        let notifier = Arc::new(notifier);
        let bus = Arc::new(EventBus::default());
        let runner = AutomationRunner::new(store.clone(), notifier.clone(), Arc::clone(&bus));
        let pipeline = SubmissionPipeline::new(store.clone(), runner, Arc::clone(&bus));
        Fixture {
            store,
            notifier,
            pipeline,
            bus,
            form_id: form.id,
        }
    }

    fn values(pairs: &[(&str, &str)]) -> SubmissionValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // -- validation --

    #[tokio::test]
    async fn missing_required_and_bad_number_are_both_reported() {
        let f = fixture(true, RecordingNotifier::default()).await;

        let err = f
            .pipeline
            .submit(f.form_id, values(&[("f1", ""), ("f2", "abc")]))
            .await
            .unwrap_err();
        assert_eq!(err.failing_field_ids(), vec!["f1", "f2"]);
        assert_eq!(f.store.submission_count().await, 0);

        let ok = f
            .pipeline
            .submit(f.form_id, values(&[("f1", "x"), ("f2", "3")]))
            .await
            .unwrap();
        assert_eq!(ok.data["f1"], "x");
        assert_eq!(f.store.submission_count().await, 1);
    }

    #[tokio::test]
    async fn unpublished_form_rejects_submissions() {
        let f = fixture(false, RecordingNotifier::default()).await;
        let err = f
            .pipeline
            .submit(f.form_id, values(&[("f1", "x")]))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotPublished(id) if id == f.form_id);
    }

    #[tokio::test]
    async fn malformed_linkage_is_rejected_before_storing() {
        let f = fixture(true, RecordingNotifier::default()).await;
        let err = f
            .pipeline
            .submit(f.form_id, values(&[("f1", "x"), ("taskId", "seven")]))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(f.store.submission_count().await, 0);
    }

    // -- lifecycle --

    #[tokio::test]
    async fn task_takes_precedence_over_assignment() {
        let f = fixture(true, RecordingNotifier::default()).await;
        f.store.seed_lifecycle(LifecycleKind::Task, 7, "open").await;
        f.store.seed_lifecycle(LifecycleKind::Assignment, 9, "open").await;
        f.store.seed_lifecycle(LifecycleKind::Visit, 4, "scheduled").await;

        let submission = f
            .pipeline
            .submit(
                f.form_id,
                values(&[("f1", "x"), ("taskId", "7"), ("assignmentId", "9"), ("visitId", "4")]),
            )
            .await
            .unwrap();
        assert_eq!(submission.task_id, Some(7));

        let task = f.store.lifecycle(LifecycleKind::Task, 7).await.unwrap();
        assert_eq!(task.status, STATUS_DONE);
        let assignment = f.store.lifecycle(LifecycleKind::Assignment, 9).await.unwrap();
        assert_eq!(assignment.status, "open");
        let visit = f.store.lifecycle(LifecycleKind::Visit, 4).await.unwrap();
        assert_eq!(visit.status, STATUS_COMPLETED);
    }

    #[tokio::test]
    async fn assignment_completion_is_timestamped() {
        let f = fixture(true, RecordingNotifier::default()).await;
        f.store.seed_lifecycle(LifecycleKind::Assignment, 9, "open").await;

        f.pipeline
            .submit(f.form_id, values(&[("f1", "x"), ("assignmentId", "9")]))
            .await
            .unwrap();

        let assignment = f.store.lifecycle(LifecycleKind::Assignment, 9).await.unwrap();
        assert_eq!(assignment.status, STATUS_COMPLETED);
        assert!(assignment.completed_at.is_some());
    }

    #[tokio::test]
    async fn lifecycle_failure_still_accepts_submission() {
        let f = fixture(true, RecordingNotifier::default()).await;
        f.store.seed_lifecycle(LifecycleKind::Task, 7, "open").await;
        f.store.fail(FailPoint::LifecycleUpdate).await;
        let mut events = f.bus.subscribe();

        let submission = f
            .pipeline
            .submit(f.form_id, values(&[("f1", "x"), ("taskId", "7")]))
            .await
            .unwrap();
        assert_eq!(submission.task_id, Some(7));
        assert_eq!(f.store.submission_count().await, 1);
        assert_eq!(f.store.lifecycle(LifecycleKind::Task, 7).await.unwrap().status, "open");

        let failed = events.try_recv().unwrap();
        assert_eq!(failed.event_type, EVENT_LIFECYCLE_FAILED);
        assert_eq!(failed.payload["kind"], "task");
        assert_eq!(failed.payload["entity_id"], 7);
        assert_eq!(events.try_recv().unwrap().event_type, EVENT_SUBMISSION_CREATED);
    }

    #[tokio::test]
    async fn unknown_task_does_not_block_visit_or_automation() {
        let f = fixture(true, RecordingNotifier::default()).await;
        f.store.seed_lifecycle(LifecycleKind::Visit, 4, "scheduled").await;
        add_rule(&f, Vec::new()).await;

        let submission = f
            .pipeline
            .submit(
                f.form_id,
                values(&[("f1", "x"), ("taskId", "999"), ("visitId", "4")]),
            )
            .await
            .unwrap();
        assert_eq!(submission.task_id, Some(999));
        assert_eq!(submission.visit_id, Some(4));

        let visit = f.store.lifecycle(LifecycleKind::Visit, 4).await.unwrap();
        assert_eq!(visit.status, STATUS_COMPLETED);

        assert!(f.pipeline.drain(Duration::from_secs(5)).await);
        let sent = f.notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].submission_id, submission.id);
    }

    // -- automation --

    async fn add_rule(f: &Fixture, conditions: Vec<Condition>) {
        let tree = f.store.get_form(f.form_id).await.unwrap().content;
        let input = NewAutomationRule {
            name: "Escalate".to_string(),
            conditions,
            recipient: "ops@example.com".to_string(),
        };
        let (conditions, actions) = input.check(&tree).unwrap();
        f.store
            .create_rule(f.form_id, &input.name, &conditions, &actions)
            .await
            .unwrap();
    }

    async fn add_urgent_rule(f: &Fixture) {
        add_rule(
            f,
            vec![Condition {
                field_id: "f1".to_string(),
                operator: ConditionOperator::Equals,
                value: "urgent".to_string(),
            }],
        )
        .await;
    }

    #[tokio::test]
    async fn matching_submission_notifies_once() {
        let f = fixture(true, RecordingNotifier::default()).await;
        add_urgent_rule(&f).await;

        let urgent = f
            .pipeline
            .submit(f.form_id, values(&[("f1", "urgent")]))
            .await
            .unwrap();
        f.pipeline
            .submit(f.form_id, values(&[("f1", "normal")]))
            .await
            .unwrap();
        assert!(f.pipeline.drain(Duration::from_secs(5)).await);

        let sent = f.notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].submission_id, urgent.id);
        assert_eq!(sent[0].subject, "Automation: Escalate");
    }

    #[tokio::test]
    async fn failing_action_does_not_fail_submission() {
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let f = fixture(true, notifier).await;
        add_urgent_rule(&f).await;

        let submission = f
            .pipeline
            .submit(f.form_id, values(&[("f1", "urgent")]))
            .await
            .unwrap();
        assert!(f.pipeline.drain(Duration::from_secs(5)).await);

        assert_eq!(submission.data["f1"], "urgent");
        assert_eq!(f.store.submission_count().await, 1);
        assert!(f.notifier.sent.lock().await.is_empty());
    }
}
