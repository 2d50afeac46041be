//! Organization-scoped role checks.
//!
//! Roles are held per organization, so they cannot be decided by an
//! extractor alone: handlers load the form (or rule) first and then call
//! [`authorize_form`] / [`authorize_org`] with the permission they need.

use formkit_core::form::FormDefinition;
use formkit_core::roles::{self, Permission, Role};
use formkit_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;

/// Require `permission` in `organization_id`, returning the user's role.
pub async fn authorize_org(
    state: &AppState,
    user: &AuthUser,
    organization_id: DbId,
    permission: Permission,
) -> AppResult<Role> {
    let role = state.access.role_for(organization_id, user.user_id).await?;
    let role = roles::authorize(role, permission).inspect_err(|_| {
        tracing::debug!(
            user_id = user.user_id,
            organization_id,
            permission = permission.as_str(),
            "Permission denied"
        );
    })?;
    Ok(role)
}

/// Load form `form_id` and require `permission` in its organization.
pub async fn authorize_form(
    state: &AppState,
    user: &AuthUser,
    form_id: DbId,
    permission: Permission,
) -> AppResult<FormDefinition> {
    let form = state.store.get_form(form_id).await?;
    authorize_org(state, user, form.organization_id, permission).await?;
    Ok(form)
}
