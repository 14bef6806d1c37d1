//! Repository implementations for the Applicants domain

pub mod applicants;
pub mod dashboard;
pub mod document_types;
pub mod documents;
pub mod housing_searches;
pub mod stage_requirements;
pub mod transactions;

use sqlx::{PgPool, Postgres, Transaction};

pub use applicants::{ApplicantFilter, ApplicantRepository, ApplicantSort};
pub use dashboard::DashboardRepository;
pub use document_types::DocumentTypeRepository;
pub use documents::ApplicantDocumentRepository;
pub use housing_searches::HousingSearchRepository;
pub use stage_requirements::{load_stage_requirements, StageRequirementRepository};
pub use transactions::*;

/// Combined repository access for the Applicants domain
#[derive(Clone)]
pub struct ApplicantsRepositories {
    pool: PgPool,
    pub applicants: ApplicantRepository,
    pub housing_searches: HousingSearchRepository,
    pub document_types: DocumentTypeRepository,
    pub stage_requirements: StageRequirementRepository,
    pub documents: ApplicantDocumentRepository,
    pub dashboard: DashboardRepository,
}

impl ApplicantsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            applicants: ApplicantRepository::new(pool.clone()),
            housing_searches: HousingSearchRepository::new(pool.clone()),
            document_types: DocumentTypeRepository::new(pool.clone()),
            stage_requirements: StageRequirementRepository::new(pool.clone()),
            documents: ApplicantDocumentRepository::new(pool.clone()),
            dashboard: DashboardRepository::new(pool.clone()),
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
