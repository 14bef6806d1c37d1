//! Property listing entity

use chrono::{DateTime, Utc};
use relocrm_common::{string_enum, Address, Error, Result, StateMachine};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "property_type", rename_all = "PascalCase")]
    pub enum PropertyType {
        #[default]
        House,
        Duplex,
        Townhouse,
        Condo,
        Apartment,
        Other,
    }
}

string_enum! {
    /// Listing status of a property
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
    #[sqlx(type_name = "listing_status", rename_all = "PascalCase")]
    pub enum ListingStatus {
        #[default]
        Active,
        UnderContract,
        OffMarket,
        Sold,
    }
}

/// Editable listing details, used for create and update
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    #[validate(nested)]
    pub address: Address,

    pub price: Decimal,

    #[validate(range(min = 0, max = 50))]
    pub bedrooms: i32,

    #[serde(default)]
    pub bathrooms: Option<Decimal>,

    #[validate(range(min = 1, max = 100000))]
    #[serde(default)]
    pub square_feet: Option<i32>,

    #[serde(default)]
    pub property_type: Option<String>,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub mls_number: Option<String>,

    #[validate(url(message = "Listing URL must be a valid URL"), length(max = 2000))]
    #[serde(default)]
    pub listing_url: Option<String>,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub description: Option<String>,
}

impl PropertyInfo {
    /// Checks that need more than per-field validation
    fn check(&self) -> Result<PropertyType> {
        let mut errors = Vec::new();
        if self.price <= Decimal::ZERO {
            errors.push("Price must be greater than zero".to_string());
        }
        if self.bathrooms.is_some_and(|b| b.is_sign_negative()) {
            errors.push("Bathrooms cannot be negative".to_string());
        }
        let property_type = match self.property_type.as_deref().map(str::trim) {
            None | Some("") => PropertyType::default(),
            Some(value) => match value.parse() {
                Ok(parsed) => parsed,
                Err(Error::Validation(messages)) => {
                    errors.extend(messages);
                    PropertyType::default()
                }
                Err(other) => return Err(other),
            },
        };
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(property_type)
    }
}

/// Property listing aggregate root
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub address: Json<Address>,
    pub price: Decimal,
    pub bedrooms: i32,
    pub bathrooms: Option<Decimal>,
    pub square_feet: Option<i32>,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub mls_number: Option<String>,
    pub listing_url: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// New `Active` listing
    pub fn new(info: PropertyInfo, created_by: Option<Uuid>) -> Result<Self> {
        let property_type = info.check()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            address: Json(info.address),
            price: info.price,
            bedrooms: info.bedrooms,
            bathrooms: info.bathrooms,
            square_feet: info.square_feet,
            property_type,
            status: ListingStatus::Active,
            mls_number: info.mls_number,
            listing_url: info.listing_url,
            description: info.description,
            created_by,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the listing details. Returns whether the coordinates changed.
    pub fn update_info(&mut self, info: PropertyInfo) -> Result<bool> {
        let property_type = info.check()?;
        let moved = self.address.coordinates() != info.address.coordinates();
        self.address = Json(info.address);
        self.price = info.price;
        self.bedrooms = info.bedrooms;
        self.bathrooms = info.bathrooms;
        self.square_feet = info.square_feet;
        self.property_type = property_type;
        self.mls_number = info.mls_number;
        self.listing_url = info.listing_url;
        self.description = info.description;
        self.updated_at = Utc::now();
        Ok(moved)
    }

    /// Street line used in activity descriptions
    pub fn street(&self) -> &str {
        self.address.street.trim()
    }

    pub fn change_status(&mut self, next: ListingStatus) -> Result<ListingStatus> {
        let previous = self.status;
        self.status = previous.transition_to(next)?;
        self.updated_at = Utc::now();
        Ok(previous)
    }

    /// Returns false when already deleted
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
}
