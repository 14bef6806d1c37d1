//! Dashboard statistics
//!
//! Rows are loaded as lightweight read models and grouped in process.

use std::collections::BTreeMap;

use serde::Serialize;

use super::entities::{ApplicantStatus, BoardDecision};
use super::housing::HousingSearchStage;

/// Status columns of one non-deleted applicant
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicantStatusRow {
    pub status: ApplicantStatus,
    pub board_decision: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applicants: i64,
    pub applicants_by_status: BTreeMap<String, i64>,
    pub pending_board_reviews: i64,
    pub active_housing_searches: i64,
    pub searches_by_stage: BTreeMap<String, i64>,
    pub total_properties: i64,
    pub properties_by_status: BTreeMap<String, i64>,
    pub upcoming_showings: i64,
    pub overdue_reminders: i64,
}

/// Counts that are computed in SQL rather than grouped here
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleCounts {
    pub upcoming_showings: i64,
    pub overdue_reminders: i64,
}

impl DashboardStats {
    pub fn aggregate(
        applicants: &[ApplicantStatusRow],
        active_search_stages: &[HousingSearchStage],
        property_statuses: &[String],
        schedule: ScheduleCounts,
    ) -> Self {
        let mut applicants_by_status: BTreeMap<String, i64> = ApplicantStatus::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        let mut pending_board_reviews = 0;
        for row in applicants {
            *applicants_by_status.entry(row.status.to_string()).or_default() += 1;

            let decision = row
                .board_decision
                .as_deref()
                .and_then(|d| d.parse::<BoardDecision>().ok())
                .unwrap_or_default();
            if row.status == ApplicantStatus::Submitted && decision == BoardDecision::Pending {
                pending_board_reviews += 1;
            }
        }

        let mut searches_by_stage: BTreeMap<String, i64> = HousingSearchStage::ALL
            .iter()
            .map(|s| (s.to_string(), 0))
            .collect();
        for stage in active_search_stages {
            *searches_by_stage.entry(stage.to_string()).or_default() += 1;
        }

        let mut properties_by_status: BTreeMap<String, i64> = BTreeMap::new();
        for status in property_statuses {
            *properties_by_status.entry(status.clone()).or_default() += 1;
        }

        Self {
            total_applicants: applicants.len() as i64,
            applicants_by_status,
            pending_board_reviews,
            active_housing_searches: active_search_stages.len() as i64,
            searches_by_stage,
            total_properties: property_statuses.len() as i64,
            properties_by_status,
            upcoming_showings: schedule.upcoming_showings,
            overdue_reminders: schedule.overdue_reminders,
        }
    }
}
