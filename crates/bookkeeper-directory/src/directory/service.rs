use std::sync::Arc;

use tracing::{debug, info};

use super::categories::{CategoryTree, MainCategory};
use super::domain::ProfileId;
use super::filter::{compile, Constraint, FilterRequest, ProfileQuery};
use super::locations::EntityView;
use super::ranking::{rank, RankedResult};
use super::repository::{DirectoryStore, StoreError};
use super::resolver::resolve_by_categories;
use super::views::{AdminProfileView, MapMarker, OfferedService, ProfileSummary, PublicProfile};
use super::visibility::is_publicly_visible;

/// Proof that the caller passed the admin gate. Only [`AdminGate`] hands these out.
#[derive(Debug, Clone)]
pub struct AdminContext {
    _private: (),
}

/// Checks bearer tokens for the back-office endpoints.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    token: Option<String>,
}

impl AdminGate {
    /// A gate without a token refuses everyone.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }

    pub fn authorize(&self, presented: Option<&str>) -> Result<AdminContext, DirectoryServiceError> {
        match (&self.token, presented) {
            (Some(expected), Some(presented)) if expected == presented.trim() => {
                Ok(AdminContext { _private: () })
            }
            _ => Err(DirectoryServiceError::Forbidden),
        }
    }
}

/// Single query pipeline shared by every listing, map, and profile view.
pub struct DirectoryService<S> {
    store: Arc<S>,
}

impl<S> DirectoryService<S>
where
    S: DirectoryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Visibility → filters → category membership → ranking.
    pub fn search(
        &self,
        request: &FilterRequest,
    ) -> Result<Vec<RankedResult>, DirectoryServiceError> {
        let Some(query) = self.build_query(request)? else {
            return Ok(Vec::new());
        };

        let profiles = self.store.profiles(&query)?;
        let results = rank(profiles, request.ranking_mode());
        debug!(matched = results.len(), "directory search complete");
        Ok(results)
    }

    pub fn search_summaries(
        &self,
        request: &FilterRequest,
    ) -> Result<Vec<ProfileSummary>, DirectoryServiceError> {
        Ok(self
            .search(request)?
            .iter()
            .map(ProfileSummary::from)
            .collect())
    }

    /// Homepage listing: the first `limit` visible profiles in store order.
    pub fn featured(&self, limit: usize) -> Result<Vec<ProfileSummary>, DirectoryServiceError> {
        let profiles = self.store.profiles(&ProfileQuery::public().limit(limit))?;
        Ok(profiles
            .iter()
            .map(|profile| ProfileSummary::from_profile(profile, None))
            .collect())
    }

    /// Search restricted to profiles that can be placed on a map.
    pub fn map_markers(
        &self,
        request: &FilterRequest,
    ) -> Result<Vec<MapMarker>, DirectoryServiceError> {
        let Some(query) = self.build_query(request)? else {
            return Ok(Vec::new());
        };

        let profiles = self.store.profiles(&query.and(Constraint::HasCoordinates))?;
        Ok(rank(profiles, request.ranking_mode())
            .iter()
            .filter_map(MapMarker::from_ranked)
            .collect())
    }

    /// Public profile page. Profiles that fail visibility are reported as missing.
    pub fn profile(&self, slug: &str) -> Result<PublicProfile, DirectoryServiceError> {
        let profile = self
            .store
            .profile_by_slug(slug)?
            .filter(is_publicly_visible)
            .ok_or(DirectoryServiceError::NotFound)?;

        let taxonomy = self.store.category_tree()?;
        let locations = self.store.location_hierarchy()?;
        let services = self
            .store
            .services_of(&profile.id)?
            .into_iter()
            .filter_map(|id| {
                taxonomy.name_of(&id).map(|name| OfferedService {
                    name: name.to_string(),
                    id: id.0,
                })
            })
            .collect();

        let city = profile
            .business_city_id
            .as_ref()
            .and_then(|id| locations.city(id));
        let entity = profile
            .business_city_id
            .as_ref()
            .and_then(|id| locations.entity_of_city(id));

        Ok(PublicProfile {
            summary: ProfileSummary::from_profile(&profile, None),
            long_description: profile.long_description.clone(),
            city_name: city.map(|city| city.name.clone()),
            entity_name: entity.map(|entity| entity.name.clone()),
            services,
        })
    }

    pub fn categories(&self) -> Result<Vec<MainCategory>, DirectoryServiceError> {
        Ok(self.store.category_tree()?.main_categories(None).to_vec())
    }

    pub fn locations(&self) -> Result<Vec<EntityView>, DirectoryServiceError> {
        Ok(self.store.location_hierarchy()?.tree())
    }

    /// Every profile, newest first, including ones hidden from public listings.
    pub fn admin_profiles(
        &self,
        _admin: &AdminContext,
    ) -> Result<Vec<AdminProfileView>, DirectoryServiceError> {
        let mut profiles = self.store.all_profiles()?;
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles.iter().map(AdminProfileView::from).collect())
    }

    pub fn set_active(
        &self,
        _admin: &AdminContext,
        profile_id: &ProfileId,
        active: bool,
    ) -> Result<AdminProfileView, DirectoryServiceError> {
        let profile = self.store.set_active(profile_id, active)?;
        info!(profile = %profile_id, active, "profile activation changed");
        Ok(AdminProfileView::from(&profile))
    }

    pub fn toggle_active(
        &self,
        _admin: &AdminContext,
        profile_id: &ProfileId,
    ) -> Result<AdminProfileView, DirectoryServiceError> {
        let profile = self.store.toggle_active(profile_id)?;
        info!(profile = %profile_id, active = profile.is_active, "profile activation toggled");
        Ok(AdminProfileView::from(&profile))
    }

    pub fn delete_profile(
        &self,
        _admin: &AdminContext,
        profile_id: &ProfileId,
    ) -> Result<(), DirectoryServiceError> {
        self.store.delete_profile(profile_id)?;
        info!(profile = %profile_id, "profile deleted");
        Ok(())
    }

    /// `None` means the category stage already rules out every profile.
    fn build_query(
        &self,
        request: &FilterRequest,
    ) -> Result<Option<ProfileQuery>, DirectoryServiceError> {
        let locations = self.store.location_hierarchy()?;
        let query = compile(request, &locations);

        if request.services.is_empty() {
            return Ok(Some(query));
        }

        let taxonomy: CategoryTree = self.store.category_tree()?;
        match resolve_by_categories(self.store.as_ref(), &taxonomy, &request.services)? {
            None => Ok(Some(query)),
            Some(ids) if ids.is_empty() => Ok(None),
            Some(ids) => Ok(Some(query.and(Constraint::IdIn(ids)))),
        }
    }
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("profile not found")]
    NotFound,
    #[error("admin access required")]
    Forbidden,
}

impl DirectoryServiceError {
    /// Store-level `NotFound` and service-level `NotFound` mean the same thing to callers.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DirectoryServiceError::NotFound | DirectoryServiceError::Store(StoreError::NotFound)
        )
    }
}
