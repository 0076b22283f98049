use std::collections::BTreeSet;

use super::categories::CategoryTree;
use super::domain::{CategoryId, Profile, ProfileId};
use super::filter::ProfileQuery;
use super::locations::LocationHierarchy;

/// Storage abstraction over the profile, location, and taxonomy tables.
///
/// Calls are request/response; implementations own any retry policy.
pub trait DirectoryStore: Send + Sync {
    /// Rows matching every constraint of the query, in store order.
    fn profiles(&self, query: &ProfileQuery) -> Result<Vec<Profile>, StoreError>;
    fn location_hierarchy(&self) -> Result<LocationHierarchy, StoreError>;
    fn category_tree(&self) -> Result<CategoryTree, StoreError>;
    fn profile_ids_offering_any_of(
        &self,
        categories: &BTreeSet<CategoryId>,
    ) -> Result<BTreeSet<ProfileId>, StoreError>;
    fn services_of(&self, profile_id: &ProfileId) -> Result<Vec<CategoryId>, StoreError>;
    fn profile_by_slug(&self, slug: &str) -> Result<Option<Profile>, StoreError>;
    /// Every row regardless of visibility. Admin use only.
    fn all_profiles(&self) -> Result<Vec<Profile>, StoreError>;
    fn set_active(&self, profile_id: &ProfileId, active: bool) -> Result<Profile, StoreError>;
    /// Flips `is_active` atomically and returns the updated row.
    fn toggle_active(&self, profile_id: &ProfileId) -> Result<Profile, StoreError>;
    /// Removes the profile and its service memberships.
    fn delete_profile(&self, profile_id: &ProfileId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
