//! Loads directory tables from CSV exports of the backing store.

mod parser;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;

use super::categories::{CategoryTree, CategoryTreeError, ServiceCategory};
use super::domain::{Profile, ProfileService};
use super::locations::{Canton, City, Entity, LocationError, LocationHierarchy};
use super::snapshot::DirectorySnapshot;
use parser::{read_rows, CantonRow, CategoryRow, CityRow, EntityRow, MembershipRow, ProfileRow};

pub const ENTITIES_FILE: &str = "entities.csv";
pub const CANTONS_FILE: &str = "cantons.csv";
pub const CITIES_FILE: &str = "cities.csv";
pub const CATEGORIES_FILE: &str = "service_categories.csv";
pub const PROFILES_FILE: &str = "profiles.csv";
pub const MEMBERSHIPS_FILE: &str = "profile_services.csv";

#[derive(Debug)]
pub enum SeedError {
    Io { path: PathBuf, source: std::io::Error },
    Csv { table: &'static str, source: csv::Error },
    InvalidProfile { id: String, reason: String },
    DuplicateProfile(String),
    UnknownCity { profile_id: String, city_id: String },
    UnknownMember { profile_id: String, category_id: String },
    Locations(LocationError),
    Categories(CategoryTreeError),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            SeedError::Csv { table, source } => write!(f, "invalid {} data: {}", table, source),
            SeedError::InvalidProfile { id, reason } => {
                write!(f, "profile '{}' is invalid: {}", id, reason)
            }
            SeedError::DuplicateProfile(id) => write!(f, "profile '{}' appears twice", id),
            SeedError::UnknownCity {
                profile_id,
                city_id,
            } => write!(
                f,
                "profile '{}' references unknown business city '{}'",
                profile_id, city_id
            ),
            SeedError::UnknownMember {
                profile_id,
                category_id,
            } => write!(
                f,
                "membership ({}, {}) references an unknown profile or category",
                profile_id, category_id
            ),
            SeedError::Locations(err) => write!(f, "invalid location hierarchy: {}", err),
            SeedError::Categories(err) => write!(f, "invalid service taxonomy: {}", err),
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::Io { source, .. } => Some(source),
            SeedError::Csv { source, .. } => Some(source),
            SeedError::Locations(err) => Some(err),
            SeedError::Categories(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LocationError> for SeedError {
    fn from(err: LocationError) -> Self {
        Self::Locations(err)
    }
}

impl From<CategoryTreeError> for SeedError {
    fn from(err: CategoryTreeError) -> Self {
        Self::Categories(err)
    }
}

/// Raw table contents prior to validation.
#[derive(Debug, Clone, Default)]
pub struct DirectorySeed {
    pub entities: Vec<Entity>,
    pub cantons: Vec<Canton>,
    pub cities: Vec<City>,
    pub categories: Vec<ServiceCategory>,
    pub profiles: Vec<Profile>,
    pub memberships: Vec<ProfileService>,
}

/// One reader per table, in the order the tables are validated.
pub struct SeedReaders<R> {
    pub entities: R,
    pub cantons: R,
    pub cities: R,
    pub categories: R,
    pub profiles: R,
    pub memberships: R,
}

impl DirectorySeed {
    /// Reads every table from `dir`. `cantons.csv` and `profile_services.csv` may be absent.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, SeedError> {
        let dir = dir.as_ref();
        let seed = Self {
            entities: load(dir, ENTITIES_FILE, false, |reader| {
                table::<_, EntityRow, _>(reader, ENTITIES_FILE)
            })?,
            cantons: load(dir, CANTONS_FILE, true, |reader| {
                table::<_, CantonRow, _>(reader, CANTONS_FILE)
            })?,
            cities: load(dir, CITIES_FILE, false, |reader| {
                table::<_, CityRow, _>(reader, CITIES_FILE)
            })?,
            categories: load(dir, CATEGORIES_FILE, false, |reader| {
                table::<_, CategoryRow, _>(reader, CATEGORIES_FILE)
            })?,
            profiles: load(dir, PROFILES_FILE, false, profiles)?,
            memberships: load(dir, MEMBERSHIPS_FILE, true, |reader| {
                table::<_, MembershipRow, _>(reader, MEMBERSHIPS_FILE)
            })?,
        };

        info!(
            dir = %dir.display(),
            profiles = seed.profiles.len(),
            cities = seed.cities.len(),
            categories = seed.categories.len(),
            "directory seed loaded"
        );
        Ok(seed)
    }

    pub fn from_readers<R: Read>(readers: SeedReaders<R>) -> Result<Self, SeedError> {
        Ok(Self {
            entities: table::<_, EntityRow, _>(readers.entities, ENTITIES_FILE)?,
            cantons: table::<_, CantonRow, _>(readers.cantons, CANTONS_FILE)?,
            cities: table::<_, CityRow, _>(readers.cities, CITIES_FILE)?,
            categories: table::<_, CategoryRow, _>(readers.categories, CATEGORIES_FILE)?,
            profiles: profiles(readers.profiles)?,
            memberships: table::<_, MembershipRow, _>(readers.memberships, MEMBERSHIPS_FILE)?,
        })
    }

    /// Validates cross-table references and builds the queryable snapshot.
    pub fn into_snapshot(self) -> Result<DirectorySnapshot, SeedError> {
        let locations = LocationHierarchy::new(self.entities, self.cantons, self.cities)?;
        let categories = CategoryTree::from_flat(self.categories)?;

        let mut profile_ids = BTreeSet::new();
        for profile in &self.profiles {
            if !profile_ids.insert(profile.id.clone()) {
                return Err(SeedError::DuplicateProfile(profile.id.0.clone()));
            }
            if let Some(city) = &profile.business_city_id {
                if !locations.contains_city(city) {
                    return Err(SeedError::UnknownCity {
                        profile_id: profile.id.0.clone(),
                        city_id: city.0.clone(),
                    });
                }
            }
        }

        for membership in &self.memberships {
            if !profile_ids.contains(&membership.profile_id)
                || !categories.contains(&membership.category_id)
            {
                return Err(SeedError::UnknownMember {
                    profile_id: membership.profile_id.0.clone(),
                    category_id: membership.category_id.0.clone(),
                });
            }
        }

        Ok(DirectorySnapshot::new(
            locations,
            categories,
            self.profiles,
            self.memberships,
        ))
    }
}

fn load<T, F>(dir: &Path, file: &str, optional: bool, parse: F) -> Result<Vec<T>, SeedError>
where
    F: FnOnce(File) -> Result<Vec<T>, SeedError>,
{
    let path = dir.join(file);
    match File::open(&path) {
        Ok(handle) => parse(handle),
        Err(err) if optional && err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(SeedError::Io { path, source }),
    }
}

fn table<R, Row, T>(reader: R, name: &'static str) -> Result<Vec<T>, SeedError>
where
    R: Read,
    Row: for<'de> serde::Deserialize<'de> + Into<T>,
{
    let rows: Vec<Row> = read_rows(reader).map_err(|source| SeedError::Csv {
        table: name,
        source,
    })?;
    Ok(rows.into_iter().map(Into::into).collect())
}

fn profiles<R: Read>(reader: R) -> Result<Vec<Profile>, SeedError> {
    let rows: Vec<ProfileRow> = read_rows(reader).map_err(|source| SeedError::Csv {
        table: PROFILES_FILE,
        source,
    })?;
    rows.into_iter()
        .map(|row| {
            row.into_profile()
                .map_err(|(id, reason)| SeedError::InvalidProfile { id, reason })
        })
        .collect()
}
