//! Repository for the `organization_members` table.

use formkit_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::OrganizationMember;

const COLUMNS: &str = "organization_id, user_id, role, created_at";

/// Read access to organization membership.
pub struct MemberRepo;

impl MemberRepo {
    pub async fn find(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<Option<OrganizationMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM organization_members \
             WHERE organization_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, OrganizationMember>(&query)
            .bind(organization_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
