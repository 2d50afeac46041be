//! PostgreSQL implementation of the persistence and membership
//! collaborators, built on the repositories.

use async_trait::async_trait;
use formkit_core::automation::{AutomationRule, Condition, RuleAction};
use formkit_core::designer::ElementTree;
use formkit_core::error::CoreError;
use formkit_core::fill::{SubmissionLinkage, SubmissionValues};
use formkit_core::form::{FormDefinition, LifecycleUpdate, NewForm, Submission};
use formkit_core::roles::Role;
use formkit_core::store::{AccessControl, FormStore};
use formkit_core::types::DbId;

use crate::repositories::{
    AutomationRuleRepo, FormRepo, LifecycleRepo, MemberRepo, SubmissionRepo,
};
use crate::DbPool;

/// Map a database error into the domain taxonomy.
///
/// Unique and foreign-key violations are caller problems; everything else
/// is treated as a transient persistence failure.
pub fn map_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return CoreError::Conflict(db_err.message().to_string()),
            Some("23503") => {
                return CoreError::Validation(format!(
                    "Referenced entity does not exist: {}",
                    db_err.message()
                ))
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Persistence(err.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(value).map_err(|e| CoreError::Internal(e.to_string()))
}

/// [`FormStore`] and [`AccessControl`] over a Postgres pool.
#[derive(Clone)]
pub struct PgFormStore {
    pool: DbPool,
}

impl PgFormStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl FormStore for PgFormStore {
    async fn create_form(&self, input: &NewForm) -> Result<FormDefinition, CoreError> {
        let row = FormRepo::create(
            &self.pool,
            input.organization_id,
            input.title.trim(),
            input.description.as_deref(),
        )
        .await
        .map_err(map_db_error)?;
        tracing::info!(form_id = row.id, organization_id = row.organization_id, "Form created");
        row.try_into()
    }

    async fn get_form(&self, id: DbId) -> Result<FormDefinition, CoreError> {
        FormRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| CoreError::not_found("form", id))?
            .try_into()
    }

    async fn list_forms(&self, organization_id: DbId) -> Result<Vec<FormDefinition>, CoreError> {
        FormRepo::list_by_organization(&self.pool, organization_id)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(FormDefinition::try_from)
            .collect()
    }

    async fn update_form_content(
        &self,
        id: DbId,
        content: &ElementTree,
    ) -> Result<FormDefinition, CoreError> {
        FormRepo::update_content(&self.pool, id, &content.to_json())
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| CoreError::not_found("form", id))?
            .try_into()
    }

    async fn publish_form(&self, id: DbId) -> Result<FormDefinition, CoreError> {
        FormRepo::publish(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| CoreError::not_found("form", id))?
            .try_into()
    }

    async fn create_submission(
        &self,
        form_id: DbId,
        data: &SubmissionValues,
        linkage: SubmissionLinkage,
    ) -> Result<Submission, CoreError> {
        SubmissionRepo::create(&self.pool, form_id, &to_json(data)?, linkage)
            .await
            .map_err(map_db_error)?
            .try_into()
    }

    async fn list_submissions(&self, form_id: DbId) -> Result<Vec<Submission>, CoreError> {
        SubmissionRepo::list_by_form(&self.pool, form_id)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(Submission::try_from)
            .collect()
    }

    async fn update_lifecycle_entity(&self, update: &LifecycleUpdate) -> Result<(), CoreError> {
        let updated = LifecycleRepo::update_status(
            &self.pool,
            update.kind,
            update.id,
            update.status,
            update.completed_at,
        )
        .await
        .map_err(map_db_error)?;
        if !updated {
            return Err(CoreError::not_found(update.kind.as_str(), update.id));
        }
        Ok(())
    }

    async fn list_rules(&self, form_id: DbId) -> Result<Vec<AutomationRule>, CoreError> {
        AutomationRuleRepo::list_by_form(&self.pool, form_id)
            .await
            .map_err(map_db_error)?
            .into_iter()
            .map(AutomationRule::try_from)
            .collect()
    }

    async fn create_rule(
        &self,
        form_id: DbId,
        name: &str,
        conditions: &[Condition],
        actions: &[RuleAction],
    ) -> Result<AutomationRule, CoreError> {
        AutomationRuleRepo::create(
            &self.pool,
            form_id,
            name,
            &to_json(&conditions)?,
            &to_json(&actions)?,
        )
        .await
        .map_err(map_db_error)?
        .try_into()
    }

    async fn get_rule(&self, id: DbId) -> Result<AutomationRule, CoreError> {
        AutomationRuleRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| CoreError::not_found("automation_rule", id))?
            .try_into()
    }

    async fn delete_rule(&self, id: DbId) -> Result<(), CoreError> {
        let deleted = AutomationRuleRepo::delete(&self.pool, id)
            .await
            .map_err(map_db_error)?;
        if !deleted {
            return Err(CoreError::not_found("automation_rule", id));
        }
        Ok(())
    }
}

#[async_trait]
impl AccessControl for PgFormStore {
    async fn role_for(
        &self,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Role>, CoreError> {
        let member = MemberRepo::find(&self.pool, organization_id, user_id)
            .await
            .map_err(map_db_error)?;
        member.map(|m| m.role.parse::<Role>()).transpose()
    }
}
