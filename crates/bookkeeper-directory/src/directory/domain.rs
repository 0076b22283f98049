use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub String);

/// Identifier wrapper for cities in the location hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub String);

/// Identifier wrapper for service taxonomy nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_inner!(ProfileId, CityId, CategoryId);

/// Whether a listing represents a sole practitioner or a firm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessType {
    #[default]
    Individual,
    Company,
}

impl BusinessType {
    pub fn label(&self) -> &'static str {
        match self {
            BusinessType::Individual => "Samostalni knjigovođa",
            BusinessType::Company => "Firma",
        }
    }
}

/// Latitude/longitude pair in decimal degrees, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Returns `None` for non-finite or out-of-range input.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A professional's directory listing as stored in the profile table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub slug: String,
    pub business_type: BusinessType,
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub profile_image_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub works_remotely: bool,
    pub has_physical_office: bool,
    pub accepting_new_clients: bool,
    pub is_license_verified: bool,
    pub years_experience: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub business_city_id: Option<CityId>,
    pub is_active: bool,
    pub registration_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Company name for firms that supplied one, otherwise the person's full name.
    pub fn display_name(&self) -> String {
        match (self.business_type, self.company_name.as_deref()) {
            (BusinessType::Company, Some(company)) if !company.trim().is_empty() => {
                company.to_string()
            }
            _ => self.full_name(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Both coordinates must be present and in range to place the profile on a map.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude),
            _ => None,
        }
    }
}

/// Join row recording that a profile offers a service category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileService {
    pub profile_id: ProfileId,
    pub category_id: CategoryId,
}
