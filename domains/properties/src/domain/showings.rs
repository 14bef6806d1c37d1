//! Showings: scheduled visits to a matched property

use chrono::{DateTime, Utc};
use relocrm_common::{string_enum, Error, Result, StateMachine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "showing_status", rename_all = "PascalCase")]
    pub enum ShowingStatus {
        #[default]
        Scheduled,
        Completed,
        Cancelled,
        NoShow,
    }
}

pub const DEFAULT_DURATION_MINUTES: i32 = 30;
pub const MIN_DURATION_MINUTES: i32 = 5;
pub const MAX_DURATION_MINUTES: i32 = 480;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Showing {
    pub id: Uuid,
    pub property_match_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: ShowingStatus,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Showing {
    pub fn new(
        property_match_id: Uuid,
        scheduled_at: DateTime<Utc>,
        duration_minutes: Option<i32>,
        notes: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self> {
        let duration_minutes = duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(Error::validation(format!(
                "Duration must be between {} and {} minutes",
                MIN_DURATION_MINUTES, MAX_DURATION_MINUTES
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            property_match_id,
            scheduled_at,
            duration_minutes,
            status: ShowingStatus::Scheduled,
            notes,
            feedback: None,
            completed_at: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move to a new time, returning the old one
    pub fn reschedule(&mut self, scheduled_at: DateTime<Utc>) -> Result<DateTime<Utc>> {
        if self.status != ShowingStatus::Scheduled {
            return Err(Error::validation(format!(
                "Only scheduled showings can be rescheduled; this showing is {}",
                self.status
            )));
        }
        if scheduled_at == self.scheduled_at {
            return Err(Error::validation(
                "The new time must differ from the current time",
            ));
        }
        let previous = self.scheduled_at;
        self.scheduled_at = scheduled_at;
        self.updated_at = Utc::now();
        Ok(previous)
    }

    pub fn complete(&mut self, feedback: Option<String>) -> Result<()> {
        self.status = self.status.transition_to(ShowingStatus::Completed)?;
        let now = Utc::now();
        self.feedback = feedback;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Cancel; a reason is appended to the notes
    pub fn cancel(&mut self, reason: Option<&str>) -> Result<()> {
        self.status = self.status.transition_to(ShowingStatus::Cancelled)?;
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            let line = format!("Cancelled: {}", reason);
            self.notes = Some(match self.notes.take() {
                Some(notes) if !notes.trim().is_empty() => format!("{}\n{}", notes, line),
                _ => line,
            });
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn mark_no_show(&mut self) -> Result<()> {
        self.status = self.status.transition_to(ShowingStatus::NoShow)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn showing() -> Showing {
        Showing::new(
            Uuid::new_v4(),
            Utc::now() + Duration::days(1),
            None,
            Some("Bring keys".to_string()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_default_duration() {
        assert_eq!(showing().duration_minutes, DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn test_duration_bounds() {
        let at = Utc::now();
        assert!(Showing::new(Uuid::new_v4(), at, Some(4), None, None).is_err());
        assert!(Showing::new(Uuid::new_v4(), at, Some(481), None, None).is_err());
        assert!(Showing::new(Uuid::new_v4(), at, Some(480), None, None).is_ok());
    }

    #[test]
    fn test_reschedule_requires_new_time() {
        let mut s = showing();
        let original = s.scheduled_at;
        assert!(s.reschedule(original).is_err());

        let later = original + Duration::hours(2);
        assert_eq!(s.reschedule(later).unwrap(), original);
        assert_eq!(s.scheduled_at, later);
    }

    #[test]
    fn test_reschedule_only_while_scheduled() {
        let mut s = showing();
        s.complete(None).unwrap();
        assert!(s.reschedule(Utc::now()).is_err());
    }

    #[test]
    fn test_complete_records_feedback() {
        let mut s = showing();
        s.complete(Some("Loved the yard".to_string())).unwrap();
        assert_eq!(s.status, ShowingStatus::Completed);
        assert!(s.completed_at.is_some());
        assert!(s.complete(None).is_err());
    }

    #[test]
    fn test_cancel_appends_reason() {
        let mut s = showing();
        s.cancel(Some("Seller unavailable")).unwrap();
        assert_eq!(
            s.notes.as_deref(),
            Some("Bring keys\nCancelled: Seller unavailable")
        );
        assert!(s.mark_no_show().is_err());
    }
}
