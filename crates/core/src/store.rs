//! Collaborator interfaces implemented outside this crate: persistence,
//! organization membership and notification delivery.

use async_trait::async_trait;

use crate::automation::{ActionError, AutomationRule, Condition, Notification, RuleAction};
use crate::designer::ElementTree;
use crate::error::CoreError;
use crate::fill::{SubmissionLinkage, SubmissionValues};
use crate::form::{FormDefinition, LifecycleUpdate, NewForm, Submission};
use crate::roles::Role;
use crate::types::DbId;

/// Persistence for forms, submissions, rules and lifecycle entities.
///
/// Writes of form content are full-tree, last write wins.
#[async_trait]
pub trait FormStore: Send + Sync {
    async fn create_form(&self, input: &NewForm) -> Result<FormDefinition, CoreError>;

    async fn get_form(&self, id: DbId) -> Result<FormDefinition, CoreError>;

    async fn list_forms(&self, organization_id: DbId) -> Result<Vec<FormDefinition>, CoreError>;

    async fn update_form_content(
        &self,
        id: DbId,
        content: &ElementTree,
    ) -> Result<FormDefinition, CoreError>;

    /// Mark a form published. Publishing an already published form is a
    /// no-op that returns the form.
    async fn publish_form(&self, id: DbId) -> Result<FormDefinition, CoreError>;

    async fn create_submission(
        &self,
        form_id: DbId,
        data: &SubmissionValues,
        linkage: SubmissionLinkage,
    ) -> Result<Submission, CoreError>;

    async fn list_submissions(&self, form_id: DbId) -> Result<Vec<Submission>, CoreError>;

    async fn update_lifecycle_entity(&self, update: &LifecycleUpdate) -> Result<(), CoreError>;

    async fn list_rules(&self, form_id: DbId) -> Result<Vec<AutomationRule>, CoreError>;

    async fn create_rule(
        &self,
        form_id: DbId,
        name: &str,
        conditions: &[Condition],
        actions: &[RuleAction],
    ) -> Result<AutomationRule, CoreError>;

    async fn get_rule(&self, id: DbId) -> Result<AutomationRule, CoreError>;

    async fn delete_rule(&self, id: DbId) -> Result<(), CoreError>;
}

/// Organization membership lookup.
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// The user's role in the organization, `None` for non-members.
    async fn role_for(&self, organization_id: DbId, user_id: DbId)
        -> Result<Option<Role>, CoreError>;
}

/// Delivery of automation notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), ActionError>;
}
