//! Handlers for the field type catalog.

use axum::Json;
use formkit_core::fields::registry::{self, FieldTypeDescriptor};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// GET /api/v1/field-types
///
/// Every field type in palette order with its defaults and property editor
/// schema.
pub async fn list_field_types(
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<FieldTypeDescriptor>>>> {
    Ok(Json(DataResponse {
        data: registry::catalog(),
    }))
}
