//! Postal address value object shared by applicants, properties and shuls

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Postal address, stored as JSONB on the owning row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[validate(length(min = 1, max = 200, message = "Street is required"))]
    pub street: String,

    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub state: String,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub zip_code: String,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Address {
    /// Single-line form used in activity descriptions
    pub fn one_line(&self) -> String {
        let mut line = self.street.trim().to_string();
        if !self.city.trim().is_empty() {
            line.push_str(", ");
            line.push_str(self.city.trim());
        }
        if !self.state.trim().is_empty() {
            line.push_str(", ");
            line.push_str(self.state.trim());
        }
        if !self.zip_code.trim().is_empty() {
            line.push(' ');
            line.push_str(self.zip_code.trim());
        }
        line
    }

    /// Coordinates when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address {
            street: "12 Main St".to_string(),
            city: "Lakewood".to_string(),
            state: "NJ".to_string(),
            zip_code: "08701".to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_one_line() {
        assert_eq!(address().one_line(), "12 Main St, Lakewood, NJ 08701");
    }

    #[test]
    fn test_one_line_skips_blank_parts() {
        let a = Address {
            state: String::new(),
            zip_code: String::new(),
            ..address()
        };
        assert_eq!(a.one_line(), "12 Main St, Lakewood");
    }

    #[test]
    fn test_coordinates_require_both() {
        let mut a = address();
        assert_eq!(a.coordinates(), None);
        a.latitude = Some(40.0);
        assert_eq!(a.coordinates(), None);
        a.longitude = Some(-74.2);
        assert_eq!(a.coordinates(), Some((40.0, -74.2)));
    }

    #[test]
    fn test_validation_requires_street_and_city() {
        let a = Address {
            street: String::new(),
            city: String::new(),
            ..address()
        };
        assert!(a.validate().is_err());
        assert!(address().validate().is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let a = Address {
            latitude: Some(120.0),
            longitude: Some(0.0),
            ..address()
        };
        assert!(a.validate().is_err());
    }
}
