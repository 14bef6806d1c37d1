//! Per-user reminder counts

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Days after today counted as upcoming
pub const UPCOMING_DAYS: i64 = 7;

/// Counts of the caller's open and snoozed reminders by effective due time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummary {
    pub overdue: i64,
    pub due_today: i64,
    pub upcoming: i64,
}

/// Time boundaries for the summary buckets.
///
/// overdue: before `now`; due today: `now` until midnight UTC; upcoming:
/// the seven days after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryWindow {
    pub now: DateTime<Utc>,
    pub end_of_today: DateTime<Utc>,
    pub end_of_upcoming: DateTime<Utc>,
}

impl SummaryWindow {
    pub fn at(now: DateTime<Utc>) -> Self {
        let end_of_today = (now.date_naive() + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now);
        Self {
            now,
            end_of_today,
            end_of_upcoming: end_of_today + Duration::days(UPCOMING_DAYS),
        }
    }
}
