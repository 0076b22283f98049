use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::categories::CategoryTree;
use super::domain::{CategoryId, Profile, ProfileId, ProfileService};
use super::filter::ProfileQuery;
use super::locations::LocationHierarchy;
use super::repository::{DirectoryStore, StoreError};

/// In-memory copy of the directory tables. Profiles keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    pub(crate) locations: LocationHierarchy,
    pub(crate) categories: CategoryTree,
    pub(crate) profiles: Vec<Profile>,
    pub(crate) services: Vec<ProfileService>,
}

impl DirectorySnapshot {
    pub fn new(
        locations: LocationHierarchy,
        categories: CategoryTree,
        profiles: Vec<Profile>,
        services: Vec<ProfileService>,
    ) -> Self {
        Self {
            locations,
            categories,
            profiles,
            services,
        }
    }

    pub fn locations(&self) -> &LocationHierarchy {
        &self.locations
    }

    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn query(&self, query: &ProfileQuery) -> Vec<Profile> {
        query.apply(&self.profiles)
    }

    pub fn profile_ids_offering_any_of(
        &self,
        categories: &BTreeSet<CategoryId>,
    ) -> BTreeSet<ProfileId> {
        self.services
            .iter()
            .filter(|membership| categories.contains(&membership.category_id))
            .map(|membership| membership.profile_id.clone())
            .collect()
    }

    pub fn services_of(&self, profile_id: &ProfileId) -> Vec<CategoryId> {
        self.services
            .iter()
            .filter(|membership| &membership.profile_id == profile_id)
            .map(|membership| membership.category_id.clone())
            .collect()
    }

    pub fn profile_by_slug(&self, slug: &str) -> Option<Profile> {
        self.profiles
            .iter()
            .find(|profile| profile.slug == slug)
            .cloned()
    }

    pub fn set_active(
        &mut self,
        profile_id: &ProfileId,
        active: bool,
    ) -> Result<Profile, StoreError> {
        self.update_activation(profile_id, |_| active)
    }

    pub fn toggle_active(&mut self, profile_id: &ProfileId) -> Result<Profile, StoreError> {
        self.update_activation(profile_id, |current| !current)
    }

    fn update_activation(
        &mut self,
        profile_id: &ProfileId,
        next: impl FnOnce(bool) -> bool,
    ) -> Result<Profile, StoreError> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|profile| &profile.id == profile_id)
            .ok_or(StoreError::NotFound)?;
        profile.is_active = next(profile.is_active);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    pub fn delete_profile(&mut self, profile_id: &ProfileId) -> Result<(), StoreError> {
        let before = self.profiles.len();
        self.profiles.retain(|profile| &profile.id != profile_id);
        if self.profiles.len() == before {
            return Err(StoreError::NotFound);
        }
        self.services
            .retain(|membership| &membership.profile_id != profile_id);
        Ok(())
    }
}

/// Thread-safe store backed by a [`DirectorySnapshot`].
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    snapshot: RwLock<DirectorySnapshot>,
}

impl InMemoryDirectoryStore {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DirectorySnapshot>, StoreError> {
        self.snapshot
            .read()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DirectorySnapshot>, StoreError> {
        self.snapshot
            .write()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))
    }
}

impl DirectoryStore for InMemoryDirectoryStore {
    fn profiles(&self, query: &ProfileQuery) -> Result<Vec<Profile>, StoreError> {
        Ok(self.read()?.query(query))
    }

    fn location_hierarchy(&self) -> Result<LocationHierarchy, StoreError> {
        Ok(self.read()?.locations.clone())
    }

    fn category_tree(&self) -> Result<CategoryTree, StoreError> {
        Ok(self.read()?.categories.clone())
    }

    fn profile_ids_offering_any_of(
        &self,
        categories: &BTreeSet<CategoryId>,
    ) -> Result<BTreeSet<ProfileId>, StoreError> {
        Ok(self.read()?.profile_ids_offering_any_of(categories))
    }

    fn services_of(&self, profile_id: &ProfileId) -> Result<Vec<CategoryId>, StoreError> {
        Ok(self.read()?.services_of(profile_id))
    }

    fn profile_by_slug(&self, slug: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.read()?.profile_by_slug(slug))
    }

    fn all_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.read()?.profiles.clone())
    }

    fn set_active(&self, profile_id: &ProfileId, active: bool) -> Result<Profile, StoreError> {
        self.write()?.set_active(profile_id, active)
    }

    fn toggle_active(&self, profile_id: &ProfileId) -> Result<Profile, StoreError> {
        self.write()?.toggle_active(profile_id)
    }

    fn delete_profile(&self, profile_id: &ProfileId) -> Result<(), StoreError> {
        self.write()?.delete_profile(profile_id)
    }
}
