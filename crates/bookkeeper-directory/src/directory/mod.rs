//! Directory query and ranking engine for the public listing, map, and profile pages,
//! plus the moderation operations used by the back office.

pub mod categories;
pub mod domain;
pub mod filter;
pub mod geo;
pub mod locations;
mod params;
pub mod ranking;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod seed;
pub mod service;
pub mod snapshot;
pub mod views;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use categories::{CategoryTree, CategoryTreeError, MainCategory, ServiceCategory, Subcategory};
pub use domain::{
    BusinessType, CategoryId, CityId, Coordinates, Profile, ProfileId, ProfileService,
};
pub use filter::{compile, Constraint, FilterRequest, ProfileQuery};
pub use geo::distance_km;
pub use locations::{Canton, City, Entity, LocationError, LocationHierarchy};
pub use ranking::{rank, RankedResult, RankingMode};
pub use repository::{DirectoryStore, StoreError};
pub use resolver::resolve_by_categories;
pub use router::{directory_router, DirectoryState};
pub use seed::{DirectorySeed, SeedError};
pub use service::{AdminContext, AdminGate, DirectoryService, DirectoryServiceError};
pub use snapshot::{DirectorySnapshot, InMemoryDirectoryStore};
pub use views::{AdminProfileView, MapMarker, ProfileSummary, PublicProfile};
pub use visibility::is_publicly_visible;
