//! Property-to-shul distances
//!
//! Straight-line distance is scaled by a street-grid factor to approximate
//! walking routes. Walking time assumes 3 mph and rounds up to the minute.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use relocrm_common::Address;
use serde::Serialize;
use sqlx::types::Json;
use uuid::Uuid;

use super::entities::Shul;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Walking routes follow streets, not straight lines
pub const STREET_GRID_FACTOR: f64 = 1.25;

pub const WALKING_SPEED_MPH: f64 = 3.0;

/// Great-circle distance in miles between two (latitude, longitude) points
pub fn haversine_miles(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Estimated walking distance in miles (two decimals) and minutes
pub fn walking_distance(from: (f64, f64), to: (f64, f64)) -> (f64, i32) {
    let miles = haversine_miles(from, to) * STREET_GRID_FACTOR;
    let minutes = (miles / WALKING_SPEED_MPH * 60.0).ceil() as i32;
    ((miles * 100.0).round() / 100.0, minutes)
}

/// Cached distance row, keyed by (property, shul)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyShulDistance {
    pub property_id: Uuid,
    pub shul_id: Uuid,
    pub distance_miles: f64,
    pub walking_minutes: i32,
    pub calculated_at: DateTime<Utc>,
}

impl PropertyShulDistance {
    pub fn calculate(
        property_id: Uuid,
        property_at: (f64, f64),
        shul_id: Uuid,
        shul_at: (f64, f64),
    ) -> Self {
        let (distance_miles, walking_minutes) = walking_distance(property_at, shul_at);
        Self {
            property_id,
            shul_id,
            distance_miles,
            walking_minutes,
            calculated_at: Utc::now(),
        }
    }
}

/// Distance from a property to one shul, as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShulDistance {
    pub shul_id: Uuid,
    pub shul_name: String,
    pub shul_address: Json<Address>,
    pub distance_miles: f64,
    pub walking_minutes: i32,
    pub calculated_at: DateTime<Utc>,
}

impl ShulDistance {
    pub fn new(shul: &Shul, distance: &PropertyShulDistance) -> Self {
        Self {
            shul_id: shul.id,
            shul_name: shul.name.clone(),
            shul_address: shul.address.clone(),
            distance_miles: distance.distance_miles,
            walking_minutes: distance.walking_minutes,
            calculated_at: distance.calculated_at,
        }
    }
}

/// Pair every shul with its cached distance, calculating the pairs that are
/// missing. Returns the distances nearest first and the rows to store.
pub fn resolve_distances(
    property_id: Uuid,
    property_at: (f64, f64),
    shuls: &[Shul],
    cached: &HashMap<Uuid, PropertyShulDistance>,
) -> (Vec<ShulDistance>, Vec<PropertyShulDistance>) {
    let mut distances = Vec::with_capacity(shuls.len());
    let mut calculated = Vec::new();
    for shul in shuls {
        let Some(shul_at) = shul.coordinates() else {
            continue;
        };
        match cached.get(&shul.id) {
            Some(row) => distances.push(ShulDistance::new(shul, row)),
            None => {
                let row = PropertyShulDistance::calculate(property_id, property_at, shul.id, shul_at);
                distances.push(ShulDistance::new(shul, &row));
                calculated.push(row);
            }
        }
    }
    sort_by_distance(&mut distances);
    (distances, calculated)
}

/// Nearest first
pub fn sort_by_distance(distances: &mut [ShulDistance]) {
    distances.sort_by(|a, b| {
        a.distance_miles
            .total_cmp(&b.distance_miles)
            .then_with(|| a.shul_name.cmp(&b.shul_name))
    });
}
