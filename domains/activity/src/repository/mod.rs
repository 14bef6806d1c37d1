//! Repository implementations for the Activity domain

pub mod activity_logs;
pub mod audit_logs;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use activity_logs::{ActivityFilter, ActivityLogRepository};
pub use audit_logs::{AuditFilter, AuditLogRepository};
pub use transactions::{record_activity_tx, record_audit_tx};

/// Combined repository access for the Activity domain
#[derive(Clone)]
pub struct ActivityRepositories {
    pool: PgPool,
    pub activity: ActivityLogRepository,
    pub audit: AuditLogRepository,
}

impl ActivityRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            activity: ActivityLogRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
