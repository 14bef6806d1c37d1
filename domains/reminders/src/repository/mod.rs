//! Repository implementations for the Reminders domain

pub mod reminders;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use reminders::{ReminderFilter, ReminderRepository};
pub use transactions::*;

/// Combined repository access for the Reminders domain
#[derive(Clone)]
pub struct RemindersRepositories {
    pool: PgPool,
    pub reminders: ReminderRepository,
}

impl RemindersRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            reminders: ReminderRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
