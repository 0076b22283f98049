use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{BusinessType, CityId, Profile, ProfileId};
use super::ranking::RankedResult;

/// Public projection of a profile for listings. Activation and onboarding state stay private.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub id: ProfileId,
    pub slug: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub business_type: BusinessType,
    pub business_type_label: &'static str,
    pub short_description: Option<String>,
    pub profile_image_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub works_remotely: bool,
    pub has_physical_office: bool,
    pub accepting_new_clients: bool,
    pub is_license_verified: bool,
    pub years_experience: u32,
    pub business_city_id: Option<CityId>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "distanceKm", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl ProfileSummary {
    pub fn from_profile(profile: &Profile, distance_km: Option<f64>) -> Self {
        Self {
            id: profile.id.clone(),
            slug: profile.slug.clone(),
            display_name: profile.display_name(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            company_name: profile.company_name.clone(),
            business_type: profile.business_type,
            business_type_label: profile.business_type.label(),
            short_description: profile.short_description.clone(),
            profile_image_url: profile.profile_image_url.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            website: profile.website.clone(),
            works_remotely: profile.works_remotely,
            has_physical_office: profile.has_physical_office,
            accepting_new_clients: profile.accepting_new_clients,
            is_license_verified: profile.is_license_verified,
            years_experience: profile.years_experience,
            business_city_id: profile.business_city_id.clone(),
            latitude: profile.latitude,
            longitude: profile.longitude,
            distance_km,
        }
    }
}

impl From<&RankedResult> for ProfileSummary {
    fn from(result: &RankedResult) -> Self {
        Self::from_profile(&result.profile, result.distance_km)
    }
}

/// Pin shown on the map views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: ProfileId,
    pub slug: String,
    pub display_name: String,
    pub business_type: BusinessType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "distanceKm", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl MapMarker {
    pub fn from_ranked(result: &RankedResult) -> Option<Self> {
        let coordinates = result.profile.coordinates()?;
        Some(Self {
            id: result.profile.id.clone(),
            slug: result.profile.slug.clone(),
            display_name: result.profile.display_name(),
            business_type: result.profile.business_type,
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            distance_km: result.distance_km,
        })
    }
}

/// Service entry rendered on a profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferedService {
    pub id: String,
    pub name: String,
}

/// Full public profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicProfile {
    #[serde(flatten)]
    pub summary: ProfileSummary,
    pub long_description: Option<String>,
    pub city_name: Option<String>,
    pub entity_name: Option<String>,
    pub services: Vec<OfferedService>,
}

/// Back-office row, including the moderation flags hidden from public views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminProfileView {
    pub id: ProfileId,
    pub slug: String,
    pub display_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub registration_completed: bool,
    pub status_label: &'static str,
    pub completion_label: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<&Profile> for AdminProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            slug: profile.slug.clone(),
            display_name: profile.display_name(),
            email: profile.email.clone(),
            is_active: profile.is_active,
            registration_completed: profile.registration_completed,
            status_label: if profile.is_active {
                "Aktivan"
            } else {
                "Neaktivan"
            },
            completion_label: if profile.registration_completed {
                "Profil potpun"
            } else {
                "Profil nepotpun"
            },
            created_at: profile.created_at,
        }
    }
}
