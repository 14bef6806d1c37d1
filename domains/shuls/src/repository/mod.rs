//! Repository implementations for the Shuls domain

pub mod distances;
pub mod shuls;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use distances::DistanceRepository;
pub use shuls::{ShulFilter, ShulRepository};
pub use transactions::*;

/// Combined repository access for the Shuls domain
#[derive(Clone)]
pub struct ShulsRepositories {
    pool: PgPool,
    pub shuls: ShulRepository,
    pub distances: DistanceRepository,
}

impl ShulsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            shuls: ShulRepository::new(pool.clone()),
            distances: DistanceRepository::new(pool.clone()),
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
