//! Repository implementations for the Properties domain

pub mod matches;
pub mod photos;
pub mod properties;
pub mod showings;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use matches::MatchRepository;
pub use photos::PhotoRepository;
pub use properties::{PropertyFilter, PropertyRepository};
pub use showings::{ShowingFilter, ShowingRepository};
pub use transactions::*;

/// Combined repository access for the Properties domain
#[derive(Clone)]
pub struct PropertiesRepositories {
    pool: PgPool,
    pub properties: PropertyRepository,
    pub photos: PhotoRepository,
    pub matches: MatchRepository,
    pub showings: ShowingRepository,
}

impl PropertiesRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            properties: PropertyRepository::new(pool.clone()),
            photos: PhotoRepository::new(pool.clone()),
            matches: MatchRepository::new(pool.clone()),
            showings: ShowingRepository::new(pool.clone()),
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
