//! Follow-up reminder entity

use chrono::{DateTime, Utc};
use relocrm_activity::EntityType;
use relocrm_common::{parse_optional, string_enum, Error, Result, StateMachine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "reminder_priority", rename_all = "PascalCase")]
    pub enum ReminderPriority {
        Low,
        #[default]
        Normal,
        High,
        Urgent,
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "reminder_status", rename_all = "PascalCase")]
    pub enum ReminderStatus {
        #[default]
        Open,
        Snoozed,
        Completed,
        Dismissed,
    }
}

/// Editable reminder fields, used for create and update
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReminderInfo {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: Option<String>,

    pub due_at: DateTime<Utc>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub assigned_to: Option<Uuid>,

    #[serde(default)]
    pub applicant_id: Option<Uuid>,

    #[serde(default)]
    pub entity_type: Option<String>,

    #[serde(default)]
    pub entity_id: Option<Uuid>,

    #[serde(default)]
    pub source_activity_id: Option<Uuid>,
}

impl ReminderInfo {
    fn check(&self) -> Result<(ReminderPriority, Option<EntityType>)> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title is required".to_string());
        }
        let priority = match parse_optional(self.priority.as_deref()) {
            Ok(priority) => priority.unwrap_or_default(),
            Err(Error::Validation(messages)) => {
                errors.extend(messages);
                ReminderPriority::default()
            }
            Err(other) => return Err(other),
        };
        let entity_type = match parse_optional::<EntityType>(self.entity_type.as_deref()) {
            Ok(entity_type) => entity_type,
            Err(Error::Validation(messages)) => {
                errors.extend(messages);
                None
            }
            Err(other) => return Err(other),
        };
        if self.entity_type.as_deref().is_some_and(|t| !t.trim().is_empty())
            != self.entity_id.is_some()
        {
            errors.push("entityType and entityId must be given together".to_string());
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok((priority, entity_type))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpReminder {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_at: DateTime<Utc>,
    pub priority: ReminderPriority,
    pub status: ReminderStatus,
    pub assigned_to: Option<Uuid>,
    pub applicant_id: Option<Uuid>,
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<Uuid>,
    pub source_activity_id: Option<Uuid>,
    pub snoozed_until: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUpReminder {
    /// New `Open` reminder
    pub fn new(info: ReminderInfo, created_by: Option<Uuid>) -> Result<Self> {
        let (priority, entity_type) = info.check()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            title: info.title.trim().to_string(),
            description: info.description,
            due_at: info.due_at,
            priority,
            status: ReminderStatus::Open,
            assigned_to: info.assigned_to,
            applicant_id: info.applicant_id,
            entity_type,
            entity_id: info.entity_id,
            source_activity_id: info.source_activity_id,
            snoozed_until: None,
            completed_at: None,
            completed_by: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_info(&mut self, info: ReminderInfo) -> Result<()> {
        if self.status == ReminderStatus::Dismissed {
            return Err(Error::validation("A dismissed reminder cannot be edited"));
        }
        let (priority, entity_type) = info.check()?;
        self.title = info.title.trim().to_string();
        self.description = info.description;
        self.due_at = info.due_at;
        self.priority = priority;
        self.assigned_to = info.assigned_to;
        self.applicant_id = info.applicant_id;
        self.entity_type = entity_type;
        self.entity_id = info.entity_id;
        self.source_activity_id = info.source_activity_id;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// `snoozed_until` while snoozed, otherwise `due_at`
    pub fn effective_due_at(&self) -> DateTime<Utc> {
        match (self.status, self.snoozed_until) {
            (ReminderStatus::Snoozed, Some(until)) => until,
            _ => self.due_at,
        }
    }

    /// Open or snoozed, with the effective due time in the past
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, ReminderStatus::Open | ReminderStatus::Snoozed)
            && self.effective_due_at() < now
    }

    fn move_to(&mut self, next: ReminderStatus) -> Result<ReminderStatus> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        self.updated_at = Utc::now();
        Ok(previous)
    }

    pub fn complete(&mut self, completed_by: Uuid) -> Result<ReminderStatus> {
        let previous = self.move_to(ReminderStatus::Completed)?;
        self.completed_at = Some(self.updated_at);
        self.completed_by = Some(completed_by);
        self.snoozed_until = None;
        Ok(previous)
    }

    /// Hide until `until`, which must be in the future
    pub fn snooze(&mut self, until: DateTime<Utc>) -> Result<()> {
        if until <= Utc::now() {
            return Err(Error::validation("Snooze time must be in the future"));
        }
        self.move_to(ReminderStatus::Snoozed)?;
        self.snoozed_until = Some(until);
        Ok(())
    }

    pub fn dismiss(&mut self) -> Result<ReminderStatus> {
        let previous = self.move_to(ReminderStatus::Dismissed)?;
        self.snoozed_until = None;
        Ok(previous)
    }

    /// Back to `Open` from snoozed or completed
    pub fn reopen(&mut self) -> Result<ReminderStatus> {
        let previous = self.move_to(ReminderStatus::Open)?;
        self.snoozed_until = None;
        self.completed_at = None;
        self.completed_by = None;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn info() -> ReminderInfo {
        ReminderInfo {
            title: " Call the Cohens ".to_string(),
            description: None,
            due_at: Utc::now() + Duration::days(1),
            priority: None,
            assigned_to: None,
            applicant_id: None,
            entity_type: None,
            entity_id: None,
            source_activity_id: None,
        }
    }

    fn reminder() -> FollowUpReminder {
        FollowUpReminder::new(info(), None).unwrap()
    }

    #[test]
    fn test_new_reminder_defaults() {
        let r = reminder();
        assert_eq!(r.status, ReminderStatus::Open);
        assert_eq!(r.priority, ReminderPriority::Normal);
        assert_eq!(r.title, "Call the Cohens");
    }

    #[test]
    fn test_entity_link_needs_both_parts() {
        let mut i = info();
        i.entity_type = Some("Property".to_string());
        assert!(FollowUpReminder::new(i.clone(), None).is_err());

        i.entity_id = Some(Uuid::new_v4());
        let r = FollowUpReminder::new(i, None).unwrap();
        assert_eq!(r.entity_type, Some(EntityType::Property));
    }

    #[test]
    fn test_bad_priority_and_entity_type_collected() {
        let mut i = info();
        i.priority = Some("Whenever".to_string());
        i.entity_type = Some("Castle".to_string());
        i.entity_id = Some(Uuid::new_v4());
        match FollowUpReminder::new(i, None) {
            Err(Error::Validation(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_snooze_requires_future_time() {
        let mut r = reminder();
        assert!(r.snooze(Utc::now() - Duration::minutes(1)).is_err());
        assert_eq!(r.status, ReminderStatus::Open);

        let until = Utc::now() + Duration::days(3);
        r.snooze(until).unwrap();
        assert_eq!(r.status, ReminderStatus::Snoozed);
        assert_eq!(r.effective_due_at(), until);
    }

    #[test]
    fn test_overdue_uses_effective_due_time() {
        let mut i = info();
        i.due_at = Utc::now() - Duration::hours(1);
        let mut r = FollowUpReminder::new(i, None).unwrap();
        assert!(r.is_overdue(Utc::now()));

        r.snooze(Utc::now() + Duration::hours(1)).unwrap();
        assert!(!r.is_overdue(Utc::now()));
    }

    #[test]
    fn test_complete_then_reopen_clears_completion() {
        let mut r = reminder();
        let user = Uuid::new_v4();
        r.complete(user).unwrap();
        assert_eq!(r.completed_by, Some(user));
        assert!(!r.is_overdue(Utc::now() + Duration::days(30)));

        assert_eq!(r.reopen().unwrap(), ReminderStatus::Completed);
        assert!(r.completed_at.is_none());
        assert!(r.completed_by.is_none());
    }

    #[test]
    fn test_dismissed_is_final() {
        let mut r = reminder();
        r.dismiss().unwrap();
        assert!(r.reopen().is_err());
        assert!(r.update_info(info()).is_err());
    }
}
