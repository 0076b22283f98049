use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::directory::categories::ServiceCategory;
use crate::directory::domain::{
    BusinessType, CategoryId, CityId, Profile, ProfileId, ProfileService,
};
use crate::directory::locations::{Canton, City, Entity};

pub(crate) fn read_rows<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<T>().collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct EntityRow {
    id: String,
    code: String,
    name: String,
}

impl From<EntityRow> for Entity {
    fn from(row: EntityRow) -> Self {
        Entity {
            id: row.id,
            code: row.code.to_ascii_lowercase(),
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CantonRow {
    id: String,
    entity_id: String,
    name: String,
}

impl From<CantonRow> for Canton {
    fn from(row: CantonRow) -> Self {
        Canton {
            id: row.id,
            entity_id: row.entity_id,
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityRow {
    id: String,
    entity_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    canton_id: Option<String>,
    name: String,
}

impl From<CityRow> for City {
    fn from(row: CityRow) -> Self {
        City {
            id: CityId(row.id),
            entity_id: row.entity_id,
            canton_id: row.canton_id,
            name: row.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryRow {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    parent_id: Option<String>,
}

impl From<CategoryRow> for ServiceCategory {
    fn from(row: CategoryRow) -> Self {
        ServiceCategory {
            id: CategoryId(row.id),
            name: row.name,
            parent_id: row.parent_id.map(CategoryId),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MembershipRow {
    profile_id: String,
    service_id: String,
}

impl From<MembershipRow> for ProfileService {
    fn from(row: MembershipRow) -> Self {
        ProfileService {
            profile_id: ProfileId(row.profile_id),
            category_id: CategoryId(row.service_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileRow {
    id: String,
    slug: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    business_type: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    company_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    short_description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    long_description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    profile_image_url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    website: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    works_remotely: bool,
    #[serde(default, deserialize_with = "flag")]
    has_physical_office: bool,
    #[serde(default, deserialize_with = "flag")]
    accepting_new_clients: bool,
    #[serde(default, deserialize_with = "flag")]
    is_license_verified: bool,
    #[serde(default)]
    years_experience: Option<u32>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    business_city_id: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    is_active: bool,
    #[serde(default, deserialize_with = "flag")]
    registration_completed: bool,
    created_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    updated_at: Option<String>,
}

impl ProfileRow {
    /// Returns the row id alongside the conversion error so callers can report it.
    pub(crate) fn into_profile(self) -> Result<Profile, (String, String)> {
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| (self.id.clone(), format!("invalid created_at '{}'", self.created_at)))?;
        let updated_at = match self.updated_at.as_deref() {
            Some(raw) => parse_timestamp(raw)
                .ok_or_else(|| (self.id.clone(), format!("invalid updated_at '{raw}'")))?,
            None => created_at,
        };
        let business_type = match self.business_type.as_deref() {
            None | Some("individual") => BusinessType::Individual,
            Some("company") => BusinessType::Company,
            Some(other) => {
                return Err((self.id.clone(), format!("unknown business_type '{other}'")));
            }
        };

        Ok(Profile {
            id: ProfileId(self.id),
            slug: self.slug,
            business_type,
            first_name: self.first_name,
            last_name: self.last_name,
            company_name: self.company_name,
            short_description: self.short_description,
            long_description: self.long_description,
            profile_image_url: self.profile_image_url,
            email: self.email,
            phone: self.phone,
            website: self.website,
            works_remotely: self.works_remotely,
            has_physical_office: self.has_physical_office,
            accepting_new_clients: self.accepting_new_clients,
            is_license_verified: self.is_license_verified,
            years_experience: self.years_experience.unwrap_or_default(),
            latitude: self.latitude,
            longitude: self.longitude,
            business_city_id: self.business_city_id.map(CityId),
            is_active: self.is_active,
            registration_completed: self.registration_completed,
            created_at,
            updated_at,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Postgres exports booleans as `t`/`f`; spreadsheets tend to use `true`/`false` or `1`/`0`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "f" | "false" | "0" | "no" => Ok(false),
        "t" | "true" | "1" | "yes" => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, found '{other}'"
        ))),
    }
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}
