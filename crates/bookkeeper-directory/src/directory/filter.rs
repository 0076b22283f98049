use std::collections::BTreeSet;

use tracing::warn;

use super::domain::{CategoryId, CityId, Profile, ProfileId};
use super::locations::LocationHierarchy;
use super::ranking::RankingMode;
use super::visibility::is_publicly_visible;

/// Caller-supplied search criteria. Every field is optional; an empty request lists every
/// publicly visible profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub text: Option<String>,
    pub entity: Option<String>,
    pub city: Option<CityId>,
    pub services: BTreeSet<CategoryId>,
    pub only_available: bool,
    pub only_verified: bool,
    pub near_me: bool,
    pub user_lat: Option<f64>,
    pub user_lng: Option<f64>,
}

impl FilterRequest {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_entity(mut self, code: impl Into<String>) -> Self {
        self.entity = Some(code.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(CityId(city.into()));
        self
    }

    pub fn with_service(mut self, category: impl Into<String>) -> Self {
        self.services.insert(CategoryId(category.into()));
        self
    }

    pub fn near(mut self, latitude: f64, longitude: f64) -> Self {
        self.near_me = true;
        self.user_lat = Some(latitude);
        self.user_lng = Some(longitude);
        self
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Proximity ranking when `near_me` is set with a usable reference point, default order otherwise.
    pub fn ranking_mode(&self) -> RankingMode {
        if !self.near_me {
            return RankingMode::Default;
        }
        match (self.user_lat, self.user_lng) {
            (Some(latitude), Some(longitude)) => RankingMode::proximity(latitude, longitude),
            _ => {
                warn!("near-me ranking requested without a reference point; using default order");
                RankingMode::Default
            }
        }
    }
}

/// One conjunct of a compiled profile query.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `is_active AND registration_completed`.
    PubliclyVisible,
    /// Case-insensitive substring over first name, last name, full name, or company name.
    NameContains(String),
    CityEquals(CityId),
    CityIn(BTreeSet<CityId>),
    IdIn(BTreeSet<ProfileId>),
    AcceptingNewClients,
    LicenseVerified,
    HasCoordinates,
}

impl Constraint {
    pub fn matches(&self, profile: &Profile) -> bool {
        match self {
            Constraint::PubliclyVisible => is_publicly_visible(profile),
            Constraint::NameContains(needle) => {
                let needle = needle.to_lowercase();
                name_fields(profile)
                    .into_iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str()))
            }
            Constraint::CityEquals(city) => profile.business_city_id.as_ref() == Some(city),
            Constraint::CityIn(cities) => profile
                .business_city_id
                .as_ref()
                .is_some_and(|city| cities.contains(city)),
            Constraint::IdIn(ids) => ids.contains(&profile.id),
            Constraint::AcceptingNewClients => profile.accepting_new_clients,
            Constraint::LicenseVerified => profile.is_license_verified,
            Constraint::HasCoordinates => profile.coordinates().is_some(),
        }
    }
}

fn name_fields(profile: &Profile) -> Vec<String> {
    let mut fields = vec![
        profile.first_name.clone(),
        profile.last_name.clone(),
        profile.full_name(),
    ];
    if let Some(company) = &profile.company_name {
        fields.push(company.clone());
    }
    fields
}

/// Conjunctive query over the profile table. Always carries the visibility constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileQuery {
    constraints: Vec<Constraint>,
    limit: Option<usize>,
}

impl ProfileQuery {
    pub fn public() -> Self {
        Self {
            constraints: vec![Constraint::PubliclyVisible],
            limit: None,
        }
    }

    pub fn and(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        self.constraints
            .iter()
            .all(|constraint| constraint.matches(profile))
    }

    /// Applies the query to rows in store order, honouring the row limit.
    pub fn apply<'a, I>(&self, rows: I) -> Vec<Profile>
    where
        I: IntoIterator<Item = &'a Profile>,
    {
        rows.into_iter()
            .filter(|profile| self.matches(profile))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

/// Translates the non-category criteria of a request into a profile query.
///
/// Unknown city ids and entity codes are ignored so a stale link widens the result set
/// instead of failing the search.
pub fn compile(request: &FilterRequest, locations: &LocationHierarchy) -> ProfileQuery {
    let mut query = ProfileQuery::public();

    if let Some(term) = request.search_term() {
        query = query.and(Constraint::NameContains(term.to_lowercase()));
    }

    if let Some(constraint) = location_constraint(request, locations) {
        query = query.and(constraint);
    }

    if request.only_available {
        query = query.and(Constraint::AcceptingNewClients);
    }
    if request.only_verified {
        query = query.and(Constraint::LicenseVerified);
    }

    query
}

fn location_constraint(
    request: &FilterRequest,
    locations: &LocationHierarchy,
) -> Option<Constraint> {
    if let Some(city) = request.city.as_ref().filter(|city| !is_wildcard(&city.0)) {
        if locations.contains_city(city) {
            return Some(Constraint::CityEquals(city.clone()));
        }
        warn!(city = %city, "ignoring unknown city filter");
    }

    let code = request
        .entity
        .as_deref()
        .filter(|code| !is_wildcard(code))?;
    match locations.cities_for_entity(code) {
        Some(cities) => Some(Constraint::CityIn(cities)),
        None => {
            warn!(entity = code, "ignoring unknown entity filter");
            None
        }
    }
}

/// Empty values and the literal `all` select every location.
fn is_wildcard(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tests::common::{locations, profile, sample_profiles};

    fn ids(profiles: &[Profile]) -> Vec<&str> {
        profiles.iter().map(|profile| profile.id.0.as_str()).collect()
    }

    #[test]
    fn empty_request_yields_visible_subset() {
        let profiles = sample_profiles();
        let query = compile(&FilterRequest::default(), &locations());
        let matched = query.apply(&profiles);

        let expected: Vec<&str> = profiles
            .iter()
            .filter(|profile| is_publicly_visible(profile))
            .map(|profile| profile.id.0.as_str())
            .collect();
        assert_eq!(ids(&matched), expected);
        assert_eq!(query.constraints(), &[Constraint::PubliclyVisible]);
    }

    #[test]
    fn text_search_is_case_insensitive_substring() {
        let ana = profile("p-ana", "Ana", "Marić");
        let hierarchy = locations();

        for term in ["ana", "MARIĆ", "a Mar", "  marić "] {
            let query = compile(&FilterRequest::default().with_text(term), &hierarchy);
            assert!(query.matches(&ana), "term {term:?} should match");
        }

        let query = compile(&FilterRequest::default().with_text("xyz"), &hierarchy);
        assert!(!query.matches(&ana));
    }

    #[test]
    fn text_search_covers_company_name() {
        let mut firm = profile("p-firm", "Edin", "Hodžić");
        firm.company_name = Some("Konto Plus d.o.o.".to_string());
        let query = compile(&FilterRequest::default().with_text("konto"), &locations());
        assert!(query.matches(&firm));
    }

    #[test]
    fn hand_built_name_constraint_ignores_case() {
        let ana = profile("p-ana", "Ana", "Marić");
        assert!(Constraint::NameContains("Ana MARIĆ".to_string()).matches(&ana));
        assert!(!Constraint::NameContains("Jovanović".to_string()).matches(&ana));
    }

    #[test]
    fn blank_text_imposes_no_constraint() {
        let query = compile(&FilterRequest::default().with_text("   "), &locations());
        assert_eq!(query.constraints().len(), 1);
    }

    #[test]
    fn city_filter_takes_precedence_over_entity() {
        let request = FilterRequest::default()
            .with_city("mostar")
            .with_entity("rs");
        let query = compile(&request, &locations());
        assert!(query
            .constraints()
            .contains(&Constraint::CityEquals(CityId("mostar".to_string()))));
        assert!(!query
            .constraints()
            .iter()
            .any(|constraint| matches!(constraint, Constraint::CityIn(_))));
    }

    #[test]
    fn entity_filter_matches_business_city_membership() {
        let mut sarajevo = profile("p-sa", "Ana", "Marić");
        sarajevo.business_city_id = Some(CityId("sarajevo".to_string()));
        let mut banja_luka = profile("p-bl", "Marko", "Jovanović");
        banja_luka.business_city_id = Some(CityId("banja-luka".to_string()));
        let mut homeless = profile("p-none", "Lejla", "Begić");
        homeless.business_city_id = None;

        let query = compile(&FilterRequest::default().with_entity("fbih"), &locations());
        assert!(query.matches(&sarajevo));
        assert!(!query.matches(&banja_luka));
        assert!(!query.matches(&homeless));
    }

    #[test]
    fn unknown_location_values_are_ignored() {
        let hierarchy = locations();
        let unknown_city = compile(&FilterRequest::default().with_city("atlantis"), &hierarchy);
        assert_eq!(unknown_city.constraints().len(), 1);

        let unknown_entity = compile(&FilterRequest::default().with_entity("xx"), &hierarchy);
        assert_eq!(unknown_entity.constraints().len(), 1);

        let wildcard = compile(
            &FilterRequest::default().with_entity("all").with_city("all"),
            &hierarchy,
        );
        assert_eq!(wildcard.constraints().len(), 1);
    }

    #[test]
    fn unknown_city_falls_back_to_entity() {
        let request = FilterRequest::default()
            .with_city("atlantis")
            .with_entity("rs");
        let query = compile(&request, &locations());
        assert!(query
            .constraints()
            .iter()
            .any(|constraint| matches!(constraint, Constraint::CityIn(cities) if cities.len() == 1)));
    }

    #[test]
    fn flag_filters_require_true_values() {
        let mut candidate = profile("p-1", "Ana", "Marić");
        candidate.accepting_new_clients = false;
        candidate.is_license_verified = true;

        let request = FilterRequest {
            only_available: true,
            ..FilterRequest::default()
        };
        assert!(!compile(&request, &locations()).matches(&candidate));

        let request = FilterRequest {
            only_verified: true,
            ..FilterRequest::default()
        };
        assert!(compile(&request, &locations()).matches(&candidate));
    }

    #[test]
    fn invisible_profiles_never_match() {
        let mut hidden = profile("p-hidden", "Ana", "Marić");
        hidden.is_active = false;
        let query = compile(&FilterRequest::default().with_text("ana"), &locations());
        assert!(!query.matches(&hidden));
    }

    #[test]
    fn limit_truncates_in_store_order() {
        let profiles = sample_profiles();
        let matched = ProfileQuery::public().limit(1).apply(&profiles);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, profiles[0].id);
    }

    #[test]
    fn ranking_mode_falls_back_without_valid_reference() {
        let mut request = FilterRequest::default();
        request.near_me = true;
        assert_eq!(request.ranking_mode(), RankingMode::Default);

        let request = FilterRequest::default().near(123.0, 18.0);
        assert_eq!(request.ranking_mode(), RankingMode::Default);

        let request = FilterRequest::default().near(43.85, 18.41);
        assert!(matches!(request.ranking_mode(), RankingMode::Proximity(_)));
    }
}
