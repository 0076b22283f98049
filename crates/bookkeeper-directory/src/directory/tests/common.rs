use std::collections::BTreeSet;
use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::directory::categories::{CategoryTree, ServiceCategory};
use crate::directory::domain::{
    BusinessType, CategoryId, CityId, Profile, ProfileId, ProfileService,
};
use crate::directory::filter::ProfileQuery;
use crate::directory::locations::{Canton, City, Entity, LocationHierarchy};
use crate::directory::repository::{DirectoryStore, StoreError};
use crate::directory::router::{directory_router, DirectoryState};
use crate::directory::service::{AdminGate, DirectoryService};
use crate::directory::snapshot::{DirectorySnapshot, InMemoryDirectoryStore};

pub(crate) const ADMIN_TOKEN: &str = "s3cret-admin";

pub(crate) const SARAJEVO: (f64, f64) = (43.8563, 18.4131);
pub(crate) const MOSTAR: (f64, f64) = (43.3438, 17.8078);
pub(crate) const BANJA_LUKA: (f64, f64) = (44.7722, 17.1910);

pub(crate) fn profile(id: &str, first_name: &str, last_name: &str) -> Profile {
    let created = Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap();
    Profile {
        id: ProfileId(id.to_string()),
        slug: format!("{}-{}", first_name, last_name).to_lowercase(),
        business_type: BusinessType::Individual,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        company_name: None,
        short_description: Some("Knjigovodstvene usluge za mala preduzeća".to_string()),
        long_description: None,
        profile_image_url: None,
        email: Some(format!("{id}@example.ba")),
        phone: None,
        website: None,
        works_remotely: false,
        has_physical_office: true,
        accepting_new_clients: false,
        is_license_verified: false,
        years_experience: 5,
        latitude: None,
        longitude: None,
        business_city_id: None,
        is_active: true,
        registration_completed: true,
        created_at: created,
        updated_at: created,
    }
}

fn placed(mut profile: Profile, city: &str, (latitude, longitude): (f64, f64)) -> Profile {
    profile.business_city_id = Some(CityId(city.to_string()));
    profile.latitude = Some(latitude);
    profile.longitude = Some(longitude);
    profile
}

pub(crate) fn locations() -> LocationHierarchy {
    let entity = |id: &str, code: &str, name: &str| Entity {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
    };
    let canton = |id: &str, name: &str| Canton {
        id: id.to_string(),
        entity_id: "e-fbih".to_string(),
        name: name.to_string(),
    };
    let city = |id: &str, entity_id: &str, canton_id: Option<&str>, name: &str| City {
        id: CityId(id.to_string()),
        entity_id: entity_id.to_string(),
        canton_id: canton_id.map(str::to_string),
        name: name.to_string(),
    };

    LocationHierarchy::new(
        vec![
            entity("e-fbih", "fbih", "Federacija BiH"),
            entity("e-rs", "rs", "Republika Srpska"),
            entity("e-brcko", "brcko", "Brčko Distrikt BiH"),
        ],
        vec![
            canton("ks", "Kanton Sarajevo"),
            canton("hnk", "Hercegovačko-neretvanski kanton"),
        ],
        vec![
            city("sarajevo", "e-fbih", Some("ks"), "Sarajevo"),
            city("mostar", "e-fbih", Some("hnk"), "Mostar"),
            city("banja-luka", "e-rs", None, "Banja Luka"),
            city("brcko", "e-brcko", None, "Brčko"),
        ],
    )
    .expect("fixture hierarchy is valid")
}

pub(crate) fn categories() -> CategoryTree {
    let row = |id: &str, name: &str, parent: Option<&str>| ServiceCategory {
        id: CategoryId(id.to_string()),
        name: name.to_string(),
        parent_id: parent.map(|parent| CategoryId(parent.to_string())),
    };

    CategoryTree::from_flat(vec![
        row("accounting", "Knjigovodstvo", None),
        row("payroll", "Obračun plata", Some("accounting")),
        row("bookkeeping", "Vođenje poslovnih knjiga", Some("accounting")),
        row("tax", "Porezno savjetovanje", None),
        row("audit", "Revizija", None),
    ])
    .expect("fixture taxonomy is valid")
}

/// Four visible profiles followed by an incomplete and an inactive one, oldest first.
pub(crate) fn sample_profiles() -> Vec<Profile> {
    let mut ana = placed(profile("p-ana", "Ana", "Marić"), "sarajevo", SARAJEVO);
    ana.slug = "ana-maric".to_string();
    ana.accepting_new_clients = true;
    ana.long_description = Some("Petnaest godina iskustva u obračunu plata.".to_string());

    let mut konto = placed(profile("p-konto", "Edin", "Hodžić"), "mostar", MOSTAR);
    konto.slug = "konto-plus".to_string();
    konto.business_type = BusinessType::Company;
    konto.company_name = Some("Konto Plus d.o.o.".to_string());
    konto.is_license_verified = true;

    let mut marko = placed(
        profile("p-marko", "Marko", "Jovanović"),
        "banja-luka",
        BANJA_LUKA,
    );
    marko.accepting_new_clients = true;
    marko.is_license_verified = true;

    let mut lejla = profile("p-lejla", "Lejla", "Begić");
    lejla.business_city_id = Some(CityId("brcko".to_string()));
    lejla.accepting_new_clients = true;

    let mut draft = placed(profile("p-draft", "Amra", "Kovač"), "sarajevo", SARAJEVO);
    draft.registration_completed = false;

    let mut inactive = placed(profile("p-inactive", "Nedim", "Hasić"), "sarajevo", SARAJEVO);
    inactive.is_active = false;

    let mut profiles = vec![ana, konto, marko, lejla, draft, inactive];
    for (offset, profile) in profiles.iter_mut().enumerate() {
        profile.created_at += Duration::days(offset as i64);
        profile.updated_at = profile.created_at;
    }
    profiles
}

pub(crate) fn memberships() -> Vec<ProfileService> {
    [
        ("p-ana", "payroll"),
        ("p-konto", "accounting"),
        ("p-konto", "audit"),
        ("p-marko", "tax"),
        ("p-lejla", "bookkeeping"),
        ("p-draft", "payroll"),
        ("p-inactive", "payroll"),
    ]
    .into_iter()
    .map(|(profile_id, category_id)| ProfileService {
        profile_id: ProfileId(profile_id.to_string()),
        category_id: CategoryId(category_id.to_string()),
    })
    .collect()
}

pub(crate) fn snapshot() -> DirectorySnapshot {
    DirectorySnapshot::new(locations(), categories(), sample_profiles(), memberships())
}

pub(crate) fn build_service() -> (
    DirectoryService<InMemoryDirectoryStore>,
    Arc<InMemoryDirectoryStore>,
) {
    let store = Arc::new(InMemoryDirectoryStore::new(snapshot()));
    (DirectoryService::new(store.clone()), store)
}

pub(crate) fn router_with_store<S>(store: Arc<S>) -> axum::Router
where
    S: DirectoryStore + 'static,
{
    directory_router(DirectoryState {
        service: Arc::new(DirectoryService::new(store)),
        admin: AdminGate::new(Some(ADMIN_TOKEN.to_string())),
        featured_limit: 2,
    })
}

pub(crate) fn router() -> axum::Router {
    router_with_store(Arc::new(InMemoryDirectoryStore::new(snapshot())))
}

pub(crate) struct UnavailableStore;

impl DirectoryStore for UnavailableStore {
    fn profiles(&self, _query: &ProfileQuery) -> Result<Vec<Profile>, StoreError> {
        Err(offline())
    }

    fn location_hierarchy(&self) -> Result<LocationHierarchy, StoreError> {
        Err(offline())
    }

    fn category_tree(&self) -> Result<CategoryTree, StoreError> {
        Err(offline())
    }

    fn profile_ids_offering_any_of(
        &self,
        _categories: &BTreeSet<CategoryId>,
    ) -> Result<BTreeSet<ProfileId>, StoreError> {
        Err(offline())
    }

    fn services_of(&self, _profile_id: &ProfileId) -> Result<Vec<CategoryId>, StoreError> {
        Err(offline())
    }

    fn profile_by_slug(&self, _slug: &str) -> Result<Option<Profile>, StoreError> {
        Err(offline())
    }

    fn all_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Err(offline())
    }

    fn set_active(&self, _profile_id: &ProfileId, _active: bool) -> Result<Profile, StoreError> {
        Err(offline())
    }

    fn toggle_active(&self, _profile_id: &ProfileId) -> Result<Profile, StoreError> {
        Err(offline())
    }

    fn delete_profile(&self, _profile_id: &ProfileId) -> Result<(), StoreError> {
        Err(offline())
    }
}

fn offline() -> StoreError {
    StoreError::Unavailable("database offline".to_string())
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(crate) fn result_ids(results: &[crate::directory::ranking::RankedResult]) -> Vec<&str> {
    results
        .iter()
        .map(|result| result.profile.id.0.as_str())
        .collect()
}
