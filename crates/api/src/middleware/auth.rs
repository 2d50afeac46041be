//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use formkit_core::error::CoreError;
use formkit_core::types::DbId;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind `Authorization: Bearer <token>`.
///
/// Carries no role: roles depend on the organization that owns the form, see
/// [`crate::middleware::rbac`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| unauthorized("Expected a Bearer token"))?;

        match verify_token(token, &state.config.jwt) {
            Ok(claims) => Ok(AuthUser { user_id: claims.sub }),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                Err(unauthorized("Invalid or expired token"))
            }
        }
    }
}
