//! Status updates on the externally owned `tasks`, `assignments` and
//! `visits` tables.

use formkit_core::form::LifecycleKind;
use formkit_core::types::{DbId, Timestamp};
use sqlx::PgPool;

/// Table backing each lifecycle kind.
fn table(kind: LifecycleKind) -> &'static str {
    match kind {
        LifecycleKind::Task => "tasks",
        LifecycleKind::Assignment => "assignments",
        LifecycleKind::Visit => "visits",
    }
}

pub struct LifecycleRepo;

impl LifecycleRepo {
    /// Set `status` (and `completed_at` when given).
    ///
    /// Returns `true` if a row was updated.
    pub async fn update_status(
        pool: &PgPool,
        kind: LifecycleKind,
        id: DbId,
        status: &str,
        completed_at: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET \
                 status       = $2, \
                 completed_at = COALESCE($3, completed_at), \
                 updated_at   = now() \
             WHERE id = $1",
            table(kind)
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(status)
            .bind(completed_at)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
