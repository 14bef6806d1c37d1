//! Housing search entity

use chrono::{DateTime, Utc};
use relocrm_common::{string_enum, Error, Result, StateMachine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "housing_search_stage", rename_all = "PascalCase")]
    pub enum HousingSearchStage {
        #[default]
        AwaitingAgreements,
        Searching,
        UnderContract,
        Closed,
        MovedIn,
    }
}

/// Search criteria, used for create and update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HousingPreferences {
    #[serde(default)]
    pub min_budget: Option<Decimal>,

    #[serde(default)]
    pub max_budget: Option<Decimal>,

    #[validate(range(min = 0, max = 20))]
    #[serde(default)]
    pub min_bedrooms: Option<i32>,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub preferred_areas: Vec<String>,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub notes: Option<String>,
}

impl HousingPreferences {
    /// Check the budget range and tidy the area list
    fn normalized(mut self) -> Result<Self> {
        let mut errors = Vec::new();
        for (label, value) in [("Minimum", self.min_budget), ("Maximum", self.max_budget)] {
            if value.is_some_and(|v| v.is_sign_negative()) {
                errors.push(format!("{} budget cannot be negative", label));
            }
        }
        if let (Some(min), Some(max)) = (self.min_budget, self.max_budget) {
            if min > max {
                errors.push("Minimum budget cannot exceed maximum budget".to_string());
            }
        }
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let mut areas: Vec<String> = Vec::with_capacity(self.preferred_areas.len());
        for area in self.preferred_areas.iter().map(|a| a.trim()) {
            if !area.is_empty() && !areas.iter().any(|a| a.eq_ignore_ascii_case(area)) {
                areas.push(area.to_string());
            }
        }
        self.preferred_areas = areas;
        Ok(self)
    }
}

/// Applicant-side process of finding a home
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HousingSearch {
    pub id: Uuid,
    pub applicant_id: Uuid,
    pub stage: HousingSearchStage,
    pub stage_changed_at: DateTime<Utc>,
    pub is_active: bool,
    pub min_budget: Option<Decimal>,
    pub max_budget: Option<Decimal>,
    pub min_bedrooms: Option<i32>,
    pub preferred_areas: Vec<String>,
    pub notes: Option<String>,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HousingSearch {
    pub fn new(applicant_id: Uuid, preferences: HousingPreferences) -> Result<Self> {
        let preferences = preferences.normalized()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            applicant_id,
            stage: HousingSearchStage::AwaitingAgreements,
            stage_changed_at: now,
            is_active: true,
            min_budget: preferences.min_budget,
            max_budget: preferences.max_budget,
            min_bedrooms: preferences.min_bedrooms,
            preferred_areas: preferences.preferred_areas,
            notes: preferences.notes,
            deactivated_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_preferences(&mut self, preferences: HousingPreferences) -> Result<()> {
        let preferences = preferences.normalized()?;
        self.min_budget = preferences.min_budget;
        self.max_budget = preferences.max_budget;
        self.min_bedrooms = preferences.min_bedrooms;
        self.preferred_areas = preferences.preferred_areas;
        self.notes = preferences.notes;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Validate and apply a stage transition, returning the previous stage
    pub fn change_stage(&mut self, next: HousingSearchStage) -> Result<HousingSearchStage> {
        if !self.is_active {
            return Err(Error::validation(
                "Cannot change the stage of an inactive housing search",
            ));
        }
        let previous = self.stage;
        self.stage = previous.transition_to(next)?;
        let now = Utc::now();
        self.stage_changed_at = now;
        self.updated_at = now;
        Ok(previous)
    }

    /// Deactivate a duplicate search. Returns false when already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        let now = Utc::now();
        self.is_active = false;
        self.deactivated_at = Some(now);
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(min: Option<i64>, max: Option<i64>) -> HousingPreferences {
        HousingPreferences {
            min_budget: min.map(Decimal::from),
            max_budget: max.map(Decimal::from),
            ..HousingPreferences::default()
        }
    }

    #[test]
    fn test_new_search_starts_awaiting_agreements() {
        let search = HousingSearch::new(Uuid::new_v4(), prefs(None, None)).unwrap();
        assert_eq!(search.stage, HousingSearchStage::AwaitingAgreements);
        assert!(search.is_active);
    }

    #[test]
    fn test_min_budget_above_max_rejected() {
        assert!(matches!(
            HousingSearch::new(Uuid::new_v4(), prefs(Some(500_000), Some(400_000))),
            Err(Error::Validation(_))
        ));
        assert!(HousingSearch::new(Uuid::new_v4(), prefs(Some(400_000), Some(400_000))).is_ok());
    }

    #[test]
    fn test_negative_budget_rejected() {
        assert!(HousingSearch::new(Uuid::new_v4(), prefs(Some(-1), None)).is_err());
    }

    #[test]
    fn test_preferred_areas_trimmed_and_deduplicated() {
        let search = HousingSearch::new(
            Uuid::new_v4(),
            HousingPreferences {
                preferred_areas: vec![
                    " Lakewood ".to_string(),
                    "lakewood".to_string(),
                    String::new(),
                    "Jackson".to_string(),
                ],
                ..HousingPreferences::default()
            },
        )
        .unwrap();
        assert_eq!(search.preferred_areas, vec!["Lakewood", "Jackson"]);
    }

    #[test]
    fn test_change_stage() {
        let mut search = HousingSearch::new(Uuid::new_v4(), prefs(None, None)).unwrap();
        let previous = search.change_stage(HousingSearchStage::Searching).unwrap();
        assert_eq!(previous, HousingSearchStage::AwaitingAgreements);
        assert!(search
            .change_stage(HousingSearchStage::MovedIn)
            .is_err());
        assert_eq!(search.stage, HousingSearchStage::Searching);
    }

    #[test]
    fn test_inactive_search_cannot_change_stage() {
        let mut search = HousingSearch::new(Uuid::new_v4(), prefs(None, None)).unwrap();
        assert!(search.deactivate());
        assert!(!search.deactivate());
        assert!(search.change_stage(HousingSearchStage::Searching).is_err());
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(
            "undercontract".parse::<HousingSearchStage>().unwrap(),
            HousingSearchStage::UnderContract
        );
        assert!("Lost".parse::<HousingSearchStage>().is_err());
    }
}
