//! Domain entities for the Applicants domain
//!
//! An applicant is a family applying to relocate into the community. The
//! spouses, address and children are value objects stored as JSONB.

use chrono::{DateTime, Utc};
use relocrm_common::{string_enum, Address, Error, Result, StateMachine};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

string_enum! {
    /// Applicant application status
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "applicant_status", rename_all = "PascalCase")]
    pub enum ApplicantStatus {
        #[default]
        Submitted,
        Approved,
        Rejected,
        Withdrawn,
    }
}

string_enum! {
    /// Board review outcome
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum BoardDecision {
        #[default]
        Pending,
        Approved,
        Deferred,
    }
}

/// One spouse of an applicant family
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpouseInfo {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    #[serde(default)]
    pub email: Option<String>,

    #[validate(length(max = 30))]
    #[serde(default)]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub occupation: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub employer: Option<String>,
}

impl SpouseInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Lower-cased email used for uniqueness checks
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    #[validate(length(min = 1, max = 100, message = "Child name is required"))]
    pub name: String,

    #[validate(range(min = 0, max = 40))]
    #[serde(default)]
    pub age: Option<i32>,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub gender: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub school: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardReview {
    pub decision: BoardDecision,
    pub decision_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
}

impl BoardReview {
    pub fn pending() -> Self {
        Self {
            decision: BoardDecision::Pending,
            decision_date: None,
            notes: None,
            reviewed_by: None,
        }
    }
}

/// Editable applicant information, used for create and update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantInfo {
    #[validate(nested)]
    pub husband: SpouseInfo,

    #[validate(nested)]
    #[serde(default)]
    pub wife: Option<SpouseInfo>,

    #[validate(nested)]
    #[serde(default)]
    pub address: Option<Address>,

    #[validate(length(max = 30))]
    #[serde(default)]
    pub phone: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub current_kehila: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub shabbos_shul: Option<String>,

    #[validate(nested)]
    #[serde(default)]
    pub children: Vec<Child>,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub notes: Option<String>,
}

impl ApplicantInfo {
    /// Husband and wife may not share an email address
    fn check_spouse_emails(&self) -> Result<()> {
        let husband = self.husband.normalized_email();
        let wife = self.wife.as_ref().and_then(SpouseInfo::normalized_email);
        if husband.is_some() && husband == wife {
            return Err(Error::DuplicateEmail(format!(
                "Husband and wife cannot share the email address '{}'",
                husband.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

/// Applicant aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: Uuid,
    pub husband: Json<SpouseInfo>,
    pub wife: Option<Json<SpouseInfo>>,
    pub address: Option<Json<Address>>,
    pub phone: Option<String>,
    pub current_kehila: Option<String>,
    pub shabbos_shul: Option<String>,
    pub children: Json<Vec<Child>>,
    pub status: ApplicantStatus,
    pub board_review: Option<Json<BoardReview>>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Applicant {
    /// New applicant in `Submitted` with a pending board review
    pub fn new(info: ApplicantInfo, created_by: Option<Uuid>) -> Result<Self> {
        info.check_spouse_emails()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            husband: Json(info.husband),
            wife: info.wife.map(Json),
            address: info.address.map(Json),
            phone: info.phone,
            current_kehila: info.current_kehila,
            shabbos_shul: info.shabbos_shul,
            children: Json(info.children),
            status: ApplicantStatus::Submitted,
            board_review: Some(Json(BoardReview::pending())),
            notes: info.notes,
            created_by,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the editable information
    pub fn update_info(&mut self, info: ApplicantInfo) -> Result<()> {
        info.check_spouse_emails()?;
        self.husband = Json(info.husband);
        self.wife = info.wife.map(Json);
        self.address = info.address.map(Json);
        self.phone = info.phone;
        self.current_kehila = info.current_kehila;
        self.shabbos_shul = info.shabbos_shul;
        self.children = Json(info.children);
        self.notes = info.notes;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Family name used in activity descriptions
    pub fn family_name(&self) -> &str {
        self.husband.last_name.trim()
    }

    /// Normalized emails of both spouses
    pub fn emails(&self) -> Vec<String> {
        let mut emails: Vec<String> = std::iter::once(self.husband.normalized_email())
            .chain(std::iter::once(
                self.wife.as_ref().and_then(|w| w.normalized_email()),
            ))
            .flatten()
            .collect();
        emails.dedup();
        emails
    }

    pub fn board_decision(&self) -> BoardDecision {
        self.board_review
            .as_ref()
            .map(|r| r.decision)
            .unwrap_or_default()
    }

    /// Validate and apply a status transition, returning the previous status
    pub fn change_status(&mut self, next: ApplicantStatus) -> Result<ApplicantStatus> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        self.updated_at = Utc::now();
        Ok(previous)
    }

    /// Record a board decision.
    ///
    /// Approval moves a `Submitted` applicant to `Approved`. Returns whether
    /// the decision is an approval.
    pub fn record_board_review(
        &mut self,
        decision: BoardDecision,
        notes: Option<String>,
        decision_date: Option<DateTime<Utc>>,
        reviewed_by: Uuid,
    ) -> Result<bool> {
        let now = Utc::now();
        self.board_review = Some(Json(BoardReview {
            decision,
            decision_date: match decision {
                BoardDecision::Pending => decision_date,
                _ => Some(decision_date.unwrap_or(now)),
            },
            notes,
            reviewed_by: Some(reviewed_by),
        }));

        let approved = decision == BoardDecision::Approved;
        if approved && self.status == ApplicantStatus::Submitted {
            self.change_status(ApplicantStatus::Approved)?;
        }
        self.updated_at = now;
        Ok(approved)
    }

    /// Mark deleted. Returns false when the applicant was already deleted.
    pub fn soft_delete(&mut self, deleted_by: Uuid) -> bool {
        if self.is_deleted {
            return false;
        }
        let now = Utc::now();
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = Some(deleted_by);
        self.updated_at = now;
        true
    }

    /// Undo a soft delete. Returns false when the applicant was not deleted.
    pub fn restore(&mut self) -> bool {
        if !self.is_deleted {
            return false;
        }
        self.is_deleted = false;
        self.deleted_at = None;
        self.deleted_by = None;
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spouse(first: &str, last: &str, email: Option<&str>) -> SpouseInfo {
        SpouseInfo {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.map(str::to_string),
            ..SpouseInfo::default()
        }
    }

    fn info() -> ApplicantInfo {
        ApplicantInfo {
            husband: spouse("Moshe", "Cohen", Some("Moshe@Example.com")),
            wife: Some(spouse("Rivka", "Cohen", Some("rivka@example.com"))),
            ..ApplicantInfo::default()
        }
    }

    #[test]
    fn test_new_applicant_defaults() {
        let applicant = Applicant::new(info(), None).unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Submitted);
        assert_eq!(applicant.board_decision(), BoardDecision::Pending);
        assert!(!applicant.is_deleted);
        assert_eq!(applicant.family_name(), "Cohen");
    }

    #[test]
    fn test_spouses_cannot_share_email() {
        let mut shared = info();
        shared.wife = Some(spouse("Rivka", "Cohen", Some(" moshe@example.COM ")));
        assert!(matches!(
            Applicant::new(shared, None),
            Err(Error::DuplicateEmail(_))
        ));
    }

    #[test]
    fn test_emails_are_normalized() {
        let applicant = Applicant::new(info(), None).unwrap();
        assert_eq!(
            applicant.emails(),
            vec!["moshe@example.com", "rivka@example.com"]
        );
    }

    #[test]
    fn test_blank_email_ignored() {
        let mut i = info();
        i.husband.email = Some("  ".to_string());
        i.wife = None;
        let applicant = Applicant::new(i, None).unwrap();
        assert!(applicant.emails().is_empty());
    }

    #[test]
    fn test_board_approval_approves_submitted_applicant() {
        let mut applicant = Applicant::new(info(), None).unwrap();
        let approved = applicant
            .record_board_review(BoardDecision::Approved, None, None, Uuid::new_v4())
            .unwrap();
        assert!(approved);
        assert_eq!(applicant.status, ApplicantStatus::Approved);
        assert!(applicant.board_review.as_ref().unwrap().decision_date.is_some());
    }

    #[test]
    fn test_board_deferral_keeps_status() {
        let mut applicant = Applicant::new(info(), None).unwrap();
        let approved = applicant
            .record_board_review(
                BoardDecision::Deferred,
                Some("Need references".to_string()),
                None,
                Uuid::new_v4(),
            )
            .unwrap();
        assert!(!approved);
        assert_eq!(applicant.status, ApplicantStatus::Submitted);
        assert_eq!(applicant.board_decision(), BoardDecision::Deferred);
    }

    #[test]
    fn test_board_approval_of_rejected_applicant_keeps_status() {
        let mut applicant = Applicant::new(info(), None).unwrap();
        applicant.change_status(ApplicantStatus::Rejected).unwrap();
        applicant
            .record_board_review(BoardDecision::Approved, None, None, Uuid::new_v4())
            .unwrap();
        assert_eq!(applicant.status, ApplicantStatus::Rejected);
    }

    #[test]
    fn test_change_status_rejects_invalid_transition() {
        let mut applicant = Applicant::new(info(), None).unwrap();
        applicant.change_status(ApplicantStatus::Withdrawn).unwrap();
        assert!(matches!(
            applicant.change_status(ApplicantStatus::Approved),
            Err(Error::Validation(_))
        ));
        assert_eq!(applicant.status, ApplicantStatus::Withdrawn);
    }

    #[test]
    fn test_soft_delete_is_idempotent() {
        let mut applicant = Applicant::new(info(), None).unwrap();
        let user = Uuid::new_v4();
        assert!(applicant.soft_delete(user));
        let deleted_at = applicant.deleted_at;
        assert!(!applicant.soft_delete(Uuid::new_v4()));
        assert_eq!(applicant.deleted_at, deleted_at);
        assert_eq!(applicant.deleted_by, Some(user));
    }

    #[test]
    fn test_restore() {
        let mut applicant = Applicant::new(info(), None).unwrap();
        assert!(!applicant.restore());
        applicant.soft_delete(Uuid::new_v4());
        assert!(applicant.restore());
        assert!(!applicant.is_deleted);
        assert!(applicant.deleted_by.is_none());
    }

    #[test]
    fn test_info_validation_is_nested() {
        let mut i = info();
        i.husband.first_name = String::new();
        i.children = vec![Child {
            name: String::new(),
            ..Child::default()
        }];
        let err = Error::from(i.validate().unwrap_err());
        match err {
            Error::Validation(messages) => {
                assert!(messages.iter().any(|m| m.starts_with("husband.first_name")));
                assert!(messages.iter().any(|m| m.starts_with("children[0].name")));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_spouse_email_rejected() {
        let mut i = info();
        i.husband.email = Some("not-an-email".to_string());
        assert!(i.validate().is_err());
    }

    #[test]
    fn test_serializes_camel_case_with_json_values() {
        let applicant = Applicant::new(info(), None).unwrap();
        let value = serde_json::to_value(&applicant).unwrap();
        assert_eq!(value["husband"]["firstName"], "Moshe");
        assert_eq!(value["status"], "Submitted");
        assert_eq!(value["boardReview"]["decision"], "Pending");
        assert_eq!(value["isDeleted"], false);
    }
}
