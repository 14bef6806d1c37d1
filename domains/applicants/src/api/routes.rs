//! Route definitions for Applicants domain API

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    applicants, dashboard, document_types, documents, housing_searches, stage_requirements,
};
use super::middleware::ApplicantsState;

/// Create all Applicants domain API routes
pub fn routes() -> Router<ApplicantsState> {
    Router::new()
        // Applicants
        .route(
            "/api/applicants",
            get(applicants::list_applicants).post(applicants::create_applicant),
        )
        .route("/api/applicants/email-exists", get(applicants::email_exists))
        .route(
            "/api/applicants/{id}",
            get(applicants::get_applicant)
                .put(applicants::update_applicant)
                .delete(applicants::delete_applicant),
        )
        .route(
            "/api/applicants/{id}/restore",
            post(applicants::restore_applicant),
        )
        .route("/api/applicants/{id}/status", put(applicants::change_status))
        .route(
            "/api/applicants/{id}/board-review",
            put(applicants::record_board_review),
        )
        // Housing searches
        .route(
            "/api/applicants/{id}/housing-searches",
            get(housing_searches::list_for_applicant).post(housing_searches::create_housing_search),
        )
        .route(
            "/api/housing-searches/{id}",
            get(housing_searches::get_housing_search).put(housing_searches::update_housing_search),
        )
        .route(
            "/api/housing-searches/{id}/stage",
            put(housing_searches::change_stage),
        )
        .route(
            "/api/housing-searches/{id}/deactivate",
            post(housing_searches::deactivate_housing_search),
        )
        // Documents
        .route(
            "/api/applicants/{id}/documents",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route(
            "/api/applicants/{id}/stage-requirements",
            get(documents::get_stage_requirements),
        )
        .route(
            "/api/documents/{id}/download-url",
            get(documents::get_download_url),
        )
        .route(
            "/api/documents/{id}",
            axum::routing::delete(documents::delete_document),
        )
        // Configuration
        .route(
            "/api/document-types",
            get(document_types::list_document_types).post(document_types::create_document_type),
        )
        .route(
            "/api/document-types/{id}",
            get(document_types::get_document_type)
                .put(document_types::update_document_type)
                .delete(document_types::deactivate_document_type),
        )
        .route(
            "/api/stage-requirements",
            get(stage_requirements::list_requirements)
                .post(stage_requirements::create_requirement),
        )
        .route(
            "/api/stage-requirements/{id}",
            put(stage_requirements::update_requirement)
                .delete(stage_requirements::delete_requirement),
        )
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::get_stats))
}
