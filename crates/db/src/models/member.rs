//! Organization membership row model.

use formkit_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `organization_members` table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationMember {
    pub organization_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}
