//! Property matches: candidate pairings of a housing search with a property

use chrono::{DateTime, Utc};
use relocrm_common::{string_enum, Address, Error, Result, StateMachine};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use super::entities::Property;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "match_status", rename_all = "PascalCase")]
    pub enum MatchStatus {
        #[default]
        MatchIdentified,
        ShowingRequested,
        ShowingScheduled,
        ShowingCompleted,
        OfferMade,
        UnderContract,
        Rejected,
    }
}

const BUDGET_POINTS: i32 = 40;
const BEDROOM_POINTS: i32 = 30;
const AREA_POINTS: i32 = 30;

/// Share of the maximum budget a price may exceed it by and still score
const BUDGET_TOLERANCE_PERCENT: i64 = 10;

/// Search criteria read from the housing search being matched
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct MatchCriteria {
    pub housing_search_id: Uuid,
    pub applicant_id: Uuid,
    pub is_active: bool,
    pub min_budget: Option<Decimal>,
    pub max_budget: Option<Decimal>,
    pub min_bedrooms: Option<i32>,
    pub preferred_areas: Vec<String>,
}

fn budget_points(price: Decimal, max_budget: Option<Decimal>) -> i32 {
    let Some(max) = max_budget else {
        return BUDGET_POINTS;
    };
    if price <= max {
        return BUDGET_POINTS;
    }
    if max <= Decimal::ZERO {
        return 0;
    }
    let tolerance = max * Decimal::new(BUDGET_TOLERANCE_PERCENT, 2);
    let over = price - max;
    if over > tolerance {
        return 0;
    }
    let remaining = Decimal::ONE - over / tolerance;
    (Decimal::from(BUDGET_POINTS) * remaining)
        .round()
        .to_i32()
        .unwrap_or(0)
}

fn bedroom_points(bedrooms: i32, min_bedrooms: Option<i32>) -> i32 {
    match min_bedrooms {
        None => BEDROOM_POINTS,
        Some(min) if bedrooms >= min => BEDROOM_POINTS,
        Some(min) if bedrooms == min - 1 => BEDROOM_POINTS / 2,
        Some(_) => 0,
    }
}

fn area_points(city: &str, preferred_areas: &[String]) -> i32 {
    let city = city.trim();
    if preferred_areas.is_empty()
        || preferred_areas
            .iter()
            .any(|area| area.trim().eq_ignore_ascii_case(city))
    {
        AREA_POINTS
    } else {
        0
    }
}

/// Score 0-100 for how well a property fits the search.
///
/// 40 points for budget (at or under the maximum scores in full, up to 10%
/// over scales down linearly), 30 for bedrooms (one short scores half) and
/// 30 for the city being a preferred area. Missing criteria score in full.
pub fn compute_match_score(criteria: &MatchCriteria, property: &Property) -> i32 {
    budget_points(property.price, criteria.max_budget)
        + bedroom_points(property.bedrooms, criteria.min_bedrooms)
        + area_points(&property.address.city, &criteria.preferred_areas)
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMatch {
    pub id: Uuid,
    pub housing_search_id: Uuid,
    pub property_id: Uuid,
    pub status: MatchStatus,
    pub match_score: i32,
    pub notes: Option<String>,
    pub offer_amount: Option<Decimal>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_score(score: i32) -> Result<i32> {
    if !(0..=100).contains(&score) {
        return Err(Error::validation("Match score must be between 0 and 100"));
    }
    Ok(score)
}

impl PropertyMatch {
    pub fn new(
        housing_search_id: Uuid,
        property_id: Uuid,
        match_score: i32,
        notes: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            housing_search_id,
            property_id,
            status: MatchStatus::MatchIdentified,
            match_score: check_score(match_score)?,
            notes,
            offer_amount: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_details(&mut self, notes: Option<String>, match_score: Option<i32>) -> Result<()> {
        if let Some(score) = match_score {
            self.match_score = check_score(score)?;
        }
        self.notes = notes;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn change_status(&mut self, next: MatchStatus) -> Result<MatchStatus> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        self.updated_at = Utc::now();
        Ok(previous)
    }

    /// Move a freshly identified match to `ShowingRequested`. Returns false
    /// and leaves the match alone in any other status.
    pub fn request_showing(&mut self) -> bool {
        if self.status != MatchStatus::MatchIdentified {
            return false;
        }
        self.status = MatchStatus::ShowingRequested;
        self.updated_at = Utc::now();
        true
    }

    /// Whether a showing may be booked for this match
    pub fn can_schedule_showing(&self) -> bool {
        matches!(
            self.status,
            MatchStatus::MatchIdentified
                | MatchStatus::ShowingRequested
                | MatchStatus::ShowingCompleted
        )
    }

    /// Move to `ShowingScheduled`, passing through `ShowingRequested` when
    /// the match has not requested a showing yet
    pub fn schedule_showing(&mut self) -> Result<MatchStatus> {
        if !self.can_schedule_showing() {
            return Err(Error::validation(format!(
                "A showing cannot be scheduled while the match is {}",
                self.status
            )));
        }
        let previous = self.status;
        if self.status != MatchStatus::ShowingRequested {
            self.status = self.status.transition_to(MatchStatus::ShowingRequested)?;
        }
        self.status = self.status.transition_to(MatchStatus::ShowingScheduled)?;
        self.updated_at = Utc::now();
        Ok(previous)
    }

    /// Record an offer and move to `OfferMade`
    pub fn make_offer(&mut self, amount: Decimal) -> Result<MatchStatus> {
        if amount <= Decimal::ZERO {
            return Err(Error::validation("Offer amount must be greater than zero"));
        }
        let previous = self.change_status(MatchStatus::OfferMade)?;
        self.offer_amount = Some(amount);
        Ok(previous)
    }
}

/// Match joined with the applicant and property it connects
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub property_match: PropertyMatch,
    pub applicant_id: Uuid,
    pub family_name: String,
    pub property_address: Json<Address>,
}

impl MatchDetail {
    /// e.g. "Showing requested for 12 Main St for Cohen"
    pub fn describe(&self, what: &str) -> String {
        format!(
            "{} for {} for {}",
            what,
            self.property_address.street.trim(),
            self.family_name.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PropertyInfo;

    fn property(price: i64, bedrooms: i32, city: &str) -> Property {
        let info = PropertyInfo {
            address: Address {
                street: "12 Main St".to_string(),
                city: city.to_string(),
                ..Address::default()
            },
            price: Decimal::from(price),
            bedrooms,
            ..PropertyInfo::default()
        };
        Property::new(info, None).unwrap()
    }

    fn criteria(max: Option<i64>, min_bedrooms: Option<i32>, areas: &[&str]) -> MatchCriteria {
        MatchCriteria {
            max_budget: max.map(Decimal::from),
            min_bedrooms,
            preferred_areas: areas.iter().map(|a| a.to_string()).collect(),
            ..MatchCriteria::default()
        }
    }

    #[test]
    fn test_perfect_match_scores_100() {
        let score = compute_match_score(
            &criteria(Some(600_000), Some(4), &["Lakewood"]),
            &property(550_000, 5, "lakewood"),
        );
        assert_eq!(score, 100);
    }

    #[test]
    fn test_no_criteria_scores_full() {
        let score = compute_match_score(&MatchCriteria::default(), &property(1, 0, "Anywhere"));
        assert_eq!(score, 100);
    }

    #[test]
    fn test_budget_overage_scales() {
        // 5% over a 500k budget keeps half the budget points
        assert_eq!(budget_points(Decimal::from(525_000), Some(Decimal::from(500_000))), 20);
        assert_eq!(budget_points(Decimal::from(550_000), Some(Decimal::from(500_000))), 0);
        assert_eq!(budget_points(Decimal::from(560_000), Some(Decimal::from(500_000))), 0);
    }

    #[test]
    fn test_bedrooms_one_short_scores_half() {
        assert_eq!(bedroom_points(3, Some(4)), 15);
        assert_eq!(bedroom_points(2, Some(4)), 0);
        assert_eq!(bedroom_points(6, Some(4)), 30);
    }

    #[test]
    fn test_area_mismatch_scores_zero() {
        assert_eq!(area_points("Toms River", &["Lakewood".to_string()]), 0);
        assert_eq!(area_points(" Jackson ", &["jackson".to_string()]), 30);
    }

    #[test]
    fn test_score_must_be_in_range() {
        assert!(PropertyMatch::new(Uuid::new_v4(), Uuid::new_v4(), 101, None, None).is_err());
        assert!(PropertyMatch::new(Uuid::new_v4(), Uuid::new_v4(), -1, None, None).is_err());
    }

    #[test]
    fn test_request_showing_only_from_identified() {
        let mut m = PropertyMatch::new(Uuid::new_v4(), Uuid::new_v4(), 80, None, None).unwrap();
        assert!(m.request_showing());
        assert_eq!(m.status, MatchStatus::ShowingRequested);
        assert!(!m.request_showing());
        assert_eq!(m.status, MatchStatus::ShowingRequested);
    }

    #[test]
    fn test_schedule_showing_passes_through_requested() {
        let mut m = PropertyMatch::new(Uuid::new_v4(), Uuid::new_v4(), 80, None, None).unwrap();
        let previous = m.schedule_showing().unwrap();
        assert_eq!(previous, MatchStatus::MatchIdentified);
        assert_eq!(m.status, MatchStatus::ShowingScheduled);
        assert!(m.schedule_showing().is_err());
    }

    #[test]
    fn test_offer_requires_completed_showing_and_positive_amount() {
        let mut m = PropertyMatch::new(Uuid::new_v4(), Uuid::new_v4(), 80, None, None).unwrap();
        assert!(m.make_offer(Decimal::from(500_000)).is_err());

        m.schedule_showing().unwrap();
        m.change_status(MatchStatus::ShowingCompleted).unwrap();
        assert!(m.make_offer(Decimal::ZERO).is_err());
        m.make_offer(Decimal::from(500_000)).unwrap();
        assert_eq!(m.status, MatchStatus::OfferMade);
        assert_eq!(m.offer_amount, Some(Decimal::from(500_000)));
    }

    #[test]
    fn test_describe() {
        let detail = MatchDetail {
            property_match: PropertyMatch::new(Uuid::new_v4(), Uuid::new_v4(), 50, None, None)
                .unwrap(),
            applicant_id: Uuid::new_v4(),
            family_name: "Cohen".to_string(),
            property_address: Json(Address {
                street: "12 Main St".to_string(),
                city: "Lakewood".to_string(),
                ..Address::default()
            }),
        };
        assert_eq!(
            detail.describe("Showing requested"),
            "Showing requested for 12 Main St for Cohen"
        );
    }
}
