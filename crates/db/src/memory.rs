//! In-memory [`FormStore`] / [`AccessControl`] for development and tests.
//!
//! Behaves like the Postgres store (ids from a sequence, newest-first
//! listings, NotFound on missing rows) and supports injecting failures at
//! named points.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use formkit_core::automation::{AutomationRule, Condition, RuleAction};
use formkit_core::designer::ElementTree;
use formkit_core::error::CoreError;
use formkit_core::fill::{SubmissionLinkage, SubmissionValues};
use formkit_core::form::{FormDefinition, LifecycleKind, LifecycleUpdate, NewForm, Submission};
use formkit_core::roles::Role;
use formkit_core::store::{AccessControl, FormStore};
use formkit_core::types::{DbId, Timestamp};
use tokio::sync::Mutex;

/// Operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ContentWrite,
    CreateSubmission,
    LifecycleUpdate,
    ListRules,
}

/// Current state of a seeded lifecycle entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRecord {
    pub status: String,
    pub completed_at: Option<Timestamp>,
}

#[derive(Default)]
struct MemoryState {
    next_id: DbId,
    forms: BTreeMap<DbId, FormDefinition>,
    submissions: Vec<Submission>,
    rules: BTreeMap<DbId, AutomationRule>,
    members: HashMap<(DbId, DbId), Role>,
    lifecycle: HashMap<(LifecycleKind, DbId), LifecycleRecord>,
    failing: HashSet<FailPoint>,
    content_writes: usize,
}

impl MemoryState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, point: FailPoint) -> Result<(), CoreError> {
        if self.failing.contains(&point) {
            return Err(CoreError::Persistence(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFormStore {
    state: Mutex<MemoryState>,
}

impl MemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `user_id` a role in `organization_id`.
    pub async fn add_member(&self, organization_id: DbId, user_id: DbId, role: Role) {
        self.state
            .lock()
            .await
            .members
            .insert((organization_id, user_id), role);
    }

    /// Register a lifecycle entity so submissions can complete it.
    pub async fn seed_lifecycle(&self, kind: LifecycleKind, id: DbId, status: &str) {
        self.state.lock().await.lifecycle.insert(
            (kind, id),
            LifecycleRecord {
                status: status.to_string(),
                completed_at: None,
            },
        );
    }

    pub async fn lifecycle(&self, kind: LifecycleKind, id: DbId) -> Option<LifecycleRecord> {
        self.state.lock().await.lifecycle.get(&(kind, id)).cloned()
    }

    /// Make every subsequent call at `point` fail with a persistence error.
    pub async fn fail(&self, point: FailPoint) {
        self.state.lock().await.failing.insert(point);
    }

    pub async fn heal(&self, point: FailPoint) {
        self.state.lock().await.failing.remove(&point);
    }

    /// Number of successful content writes so far.
    pub async fn content_writes(&self) -> usize {
        self.state.lock().await.content_writes
    }

    pub async fn submission_count(&self) -> usize {
        self.state.lock().await.submissions.len()
    }
}

#[async_trait]
impl FormStore for MemoryFormStore {
    async fn create_form(&self, input: &NewForm) -> Result<FormDefinition, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let form = FormDefinition {
            id: state.next_id(),
            organization_id: input.organization_id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            content: ElementTree::new(),
            is_published: false,
            created_at: now,
            updated_at: now,
        };
        state.forms.insert(form.id, form.clone());
        tracing::debug!(form_id = form.id, "Form created (memory)");
        Ok(form)
    }

    async fn get_form(&self, id: DbId) -> Result<FormDefinition, CoreError> {
        self.state
            .lock()
            .await
            .forms
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("form", id))
    }

    async fn list_forms(&self, organization_id: DbId) -> Result<Vec<FormDefinition>, CoreError> {
        let state = self.state.lock().await;
        let mut forms: Vec<FormDefinition> = state
            .forms
            .values()
            .filter(|f| f.organization_id == organization_id)
            .cloned()
            .collect();
        forms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(forms)
    }

    async fn update_form_content(
        &self,
        id: DbId,
        content: &ElementTree,
    ) -> Result<FormDefinition, CoreError> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::ContentWrite)?;
        let form = state
            .forms
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("form", id))?;
        form.content = content.clone();
        form.updated_at = Utc::now();
        let form = form.clone();
        state.content_writes += 1;
        Ok(form)
    }

    async fn publish_form(&self, id: DbId) -> Result<FormDefinition, CoreError> {
        let mut state = self.state.lock().await;
        let form = state
            .forms
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("form", id))?;
        if !form.is_published {
            form.is_published = true;
            form.updated_at = Utc::now();
        }
        Ok(form.clone())
    }

    async fn create_submission(
        &self,
        form_id: DbId,
        data: &SubmissionValues,
        linkage: SubmissionLinkage,
    ) -> Result<Submission, CoreError> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::CreateSubmission)?;
        if !state.forms.contains_key(&form_id) {
            return Err(CoreError::not_found("form", form_id));
        }
        let submission = Submission {
            id: state.next_id(),
            form_id,
            data: data.clone(),
            task_id: linkage.task_id,
            assignment_id: linkage.assignment_id,
            visit_id: linkage.visit_id,
            created_at: Utc::now(),
        };
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn list_submissions(&self, form_id: DbId) -> Result<Vec<Submission>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .submissions
            .iter()
            .rev()
            .filter(|s| s.form_id == form_id)
            .cloned()
            .collect())
    }

    async fn update_lifecycle_entity(&self, update: &LifecycleUpdate) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        state.check(FailPoint::LifecycleUpdate)?;
        let record = state
            .lifecycle
            .get_mut(&(update.kind, update.id))
            .ok_or_else(|| CoreError::not_found(update.kind.as_str(), update.id))?;
        record.status = update.status.to_string();
        if update.completed_at.is_some() {
            record.completed_at = update.completed_at;
        }
        Ok(())
    }

    async fn list_rules(&self, form_id: DbId) -> Result<Vec<AutomationRule>, CoreError> {
        let state = self.state.lock().await;
        state.check(FailPoint::ListRules)?;
        Ok(state
            .rules
            .values()
            .filter(|r| r.form_id == form_id)
            .cloned()
            .collect())
    }

    async fn create_rule(
        &self,
        form_id: DbId,
        name: &str,
        conditions: &[Condition],
        actions: &[RuleAction],
    ) -> Result<AutomationRule, CoreError> {
        let mut state = self.state.lock().await;
        if !state.forms.contains_key(&form_id) {
            return Err(CoreError::not_found("form", form_id));
        }
        let rule = AutomationRule {
            id: state.next_id(),
            form_id,
            name: name.to_string(),
            conditions: conditions.to_vec(),
            actions: actions.to_vec(),
            created_at: Utc::now(),
        };
        state.rules.insert(rule.id, rule.clone());
        Ok(rule)
    }

    async fn get_rule(&self, id: DbId) -> Result<AutomationRule, CoreError> {
        self.state
            .lock()
            .await
            .rules
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("automation_rule", id))
    }

    async fn delete_rule(&self, id: DbId) -> Result<(), CoreError> {
        self.state
            .lock()
            .await
            .rules
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("automation_rule", id))
    }
}

#[async_trait]
impl AccessControl for MemoryFormStore {
    async fn role_for(
        &self,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Role>, CoreError> {
        Ok(self
            .state
            .lock()
            .await
            .members
            .get(&(organization_id, user_id))
            .copied())
    }
}
