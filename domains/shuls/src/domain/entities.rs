//! Shul entity

use chrono::{DateTime, Utc};
use relocrm_common::Address;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

/// Editable shul details, used for create and update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShulInfo {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(nested)]
    pub address: Address,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub denomination: Option<String>,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub rabbi: Option<String>,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub phone: Option<String>,

    #[validate(url(message = "Website must be a valid URL"), length(max = 500))]
    #[serde(default)]
    pub website: Option<String>,
}

/// Synagogue in the directory. Coordinates live on the address.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shul {
    pub id: Uuid,
    pub name: String,
    pub address: Json<Address>,
    pub denomination: Option<String>,
    pub rabbi: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shul {
    pub fn new(info: ShulInfo) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: info.name.trim().to_string(),
            address: Json(info.address),
            denomination: info.denomination,
            rabbi: info.rabbi,
            phone: info.phone,
            website: info.website,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the details. Returns whether the coordinates changed.
    pub fn update_info(&mut self, info: ShulInfo) -> bool {
        let moved = self.address.coordinates() != info.address.coordinates();
        self.name = info.name.trim().to_string();
        self.address = Json(info.address);
        self.denomination = info.denomination;
        self.rabbi = info.rabbi;
        self.phone = info.phone;
        self.website = info.website;
        self.updated_at = Utc::now();
        moved
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.address.coordinates()
    }

    /// Returns false when already inactive
    pub fn deactivate(&mut self) -> bool {
        self.set_active(false)
    }

    /// Returns false when already active
    pub fn reactivate(&mut self) -> bool {
        self.set_active(true)
    }

    fn set_active(&mut self, active: bool) -> bool {
        if self.is_active == active {
            return false;
        }
        self.is_active = active;
        self.updated_at = Utc::now();
        true
    }
}
