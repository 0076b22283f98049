use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::ProfileId;
use super::filter::FilterRequest;
use super::repository::{DirectoryStore, StoreError};
use super::service::{AdminGate, DirectoryService, DirectoryServiceError};
use super::views::ProfileSummary;

/// Shared state behind the directory routes.
pub struct DirectoryState<S> {
    pub service: Arc<DirectoryService<S>>,
    pub admin: AdminGate,
    pub featured_limit: usize,
}

impl<S> Clone for DirectoryState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            admin: self.admin.clone(),
            featured_limit: self.featured_limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<ProfileSummary>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ActivationRequest {
    pub active: bool,
}

/// Router builder exposing the public directory and the admin back office.
pub fn directory_router<S>(state: DirectoryState<S>) -> Router
where
    S: DirectoryStore + 'static,
{
    Router::new()
        .route("/api/v1/profiles", get(search_handler::<S>))
        .route("/api/v1/profiles/:slug", get(profile_handler::<S>))
        .route("/api/v1/featured", get(featured_handler::<S>))
        .route("/api/v1/map", get(map_handler::<S>))
        .route("/api/v1/categories", get(categories_handler::<S>))
        .route("/api/v1/locations", get(locations_handler::<S>))
        .route("/api/v1/admin/profiles", get(admin_list_handler::<S>))
        .route(
            "/api/v1/admin/profiles/:profile_id/active",
            put(admin_set_active_handler::<S>),
        )
        .route(
            "/api/v1/admin/profiles/:profile_id/toggle-active",
            post(admin_toggle_handler::<S>),
        )
        .route(
            "/api/v1/admin/profiles/:profile_id",
            delete(admin_delete_handler::<S>),
        )
        .with_state(state)
}

pub(crate) async fn search_handler<S>(
    State(state): State<DirectoryState<S>>,
    RawQuery(raw): RawQuery,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let request = FilterRequest::from_query(raw.as_deref().unwrap_or_default());
    match state.service.search_summaries(&request) {
        Ok(results) => {
            let body = SearchResponse {
                count: results.len(),
                results,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn featured_handler<S>(State(state): State<DirectoryState<S>>) -> Response
where
    S: DirectoryStore + 'static,
{
    match state.service.featured(state.featured_limit) {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn map_handler<S>(
    State(state): State<DirectoryState<S>>,
    RawQuery(raw): RawQuery,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let request = FilterRequest::from_query(raw.as_deref().unwrap_or_default());
    match state.service.map_markers(&request) {
        Ok(markers) => (StatusCode::OK, Json(markers)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn profile_handler<S>(
    State(state): State<DirectoryState<S>>,
    Path(slug): Path<String>,
) -> Response
where
    S: DirectoryStore + 'static,
{
    match state.service.profile(&slug) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn categories_handler<S>(State(state): State<DirectoryState<S>>) -> Response
where
    S: DirectoryStore + 'static,
{
    match state.service.categories() {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn locations_handler<S>(State(state): State<DirectoryState<S>>) -> Response
where
    S: DirectoryStore + 'static,
{
    match state.service.locations() {
        Ok(locations) => (StatusCode::OK, Json(locations)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_list_handler<S>(
    State(state): State<DirectoryState<S>>,
    headers: HeaderMap,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let result = state
        .admin
        .authorize(bearer_token(&headers))
        .and_then(|admin| state.service.admin_profiles(&admin));
    match result {
        Ok(profiles) => (StatusCode::OK, Json(profiles)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_set_active_handler<S>(
    State(state): State<DirectoryState<S>>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let admin = match state.admin.authorize(bearer_token(&headers)) {
        Ok(admin) => admin,
        Err(error) => return error_response(error),
    };
    // Body is parsed only after the token check.
    let payload: ActivationRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            let payload = json!({ "error": format!("invalid activation request: {error}") });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    let id = ProfileId(profile_id);
    match state.service.set_active(&admin, &id, payload.active) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_toggle_handler<S>(
    State(state): State<DirectoryState<S>>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let id = ProfileId(profile_id);
    let result = state
        .admin
        .authorize(bearer_token(&headers))
        .and_then(|admin| state.service.toggle_active(&admin, &id));
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_delete_handler<S>(
    State(state): State<DirectoryState<S>>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DirectoryStore + 'static,
{
    let id = ProfileId(profile_id);
    let result = state
        .admin
        .authorize(bearer_token(&headers))
        .and_then(|admin| state.service.delete_profile(&admin, &id));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn error_response(error: DirectoryServiceError) -> Response {
    let status = match &error {
        _ if error.is_not_found() => StatusCode::NOT_FOUND,
        DirectoryServiceError::Forbidden => StatusCode::FORBIDDEN,
        DirectoryServiceError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
