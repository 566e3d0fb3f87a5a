use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use catalog::{
    CatalogError, ListedPlace, NewPlace, PlaceStore, ProfileDirectory, RankMode, RatingKey, Role,
    SortKey, UserProfile, format_distance, format_rating, load_places, rank_places, sample_places,
};
use foundation::{GeoPoint, PlaceId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use viewport::{ViewportError, ViewportState, build_static_map_request};

use crate::config::AppConfig;

const USER_HEADER: &str = "x-user-id";
const EMAIL_HEADER: &str = "x-user-email";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn PlaceStore>,
    pub profiles: Arc<ProfileDirectory>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/places", get(list_places).post(create_place))
        .route("/places/:id", get(get_place))
        .route("/map", get(get_map))
        .route("/users", get(list_users))
        .route("/users/me", get(get_me))
        .route("/users/:id/role", put(set_role))
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ListingEntry {
    #[serde(flatten)]
    place: ListedPlace,
    distance_miles: Option<f64>,
    distance_label: Option<String>,
    rating_labels: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
struct Listing {
    order: RankMode,
    observer: Option<GeoPoint>,
    places: Vec<ListingEntry>,
}

async fn list_places(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    let observer = match observer_from(q.lat, q.lng) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let key = q.sort.as_deref().map(SortKey::parse).unwrap_or_default();

    let places = load_places(state.store.as_ref()).await;
    let ranking = rank_places(places, key, observer);

    let places = ranking
        .entries
        .into_iter()
        .map(|entry| {
            let rating_labels = RatingKey::ALL
                .into_iter()
                .map(|k| (k.as_str(), format_rating(entry.place.rating(k))))
                .collect();
            ListingEntry {
                distance_label: entry.distance_miles.map(format_distance),
                distance_miles: entry.distance_miles,
                rating_labels,
                place: entry.place,
            }
        })
        .collect();

    Json(Listing {
        order: ranking.mode,
        observer,
        places,
    })
    .into_response()
}

async fn get_place(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = PlaceId::new(id);
    let stored = match state.store.get(&id).await {
        Ok(found) => found,
        Err(err) => {
            warn!("place lookup failed for {id}: {err}");
            None
        }
    };
    // Sample entries are listed when the store is empty, so they resolve too.
    let found = stored.or_else(|| sample_places().into_iter().find(|p| p.id == id));
    match found {
        Some(place) => Json(place).into_response(),
        None => catalog_error_response(&CatalogError::NotFound),
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitPlace {
    #[serde(flatten)]
    pub place: NewPlace,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

async fn create_place(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SubmitPlace>,
) -> Response {
    let Some(user) = signed_in(&state, &headers) else {
        return sign_in_required();
    };
    let location = match (body.latitude, body.longitude) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    };
    let id = PlaceId::new(uuid::Uuid::new_v4().to_string());
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let record = match body.place.into_listed(id, &user.id, location, &now) {
        Ok(r) => r,
        Err(err) => return catalog_error_response(&err),
    };

    match state.store.insert(record).await {
        Ok(saved) => {
            info!("place {} added by {}", saved.id, user.id);
            (StatusCode::CREATED, Json(saved)).into_response()
        }
        Err(err) => {
            warn!("place insert failed: {err}");
            catalog_error_response(&err)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MapQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub zoom: Option<f64>,
    pub observer_lat: Option<f64>,
    pub observer_lng: Option<f64>,
}

async fn get_map(State(state): State<AppState>, Query(q): Query<MapQuery>) -> Response {
    if !state.config.map.is_configured() {
        return map_unconfigured();
    }
    let observer = match observer_from(q.observer_lat, q.observer_lng) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let center = match observer_from(q.lat, q.lng) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let default_view = state.config.default_view;
    let view = ViewportState::new(
        center.or(observer).unwrap_or(default_view.center),
        q.zoom.unwrap_or(default_view.zoom),
    );

    let places = load_places(state.store.as_ref()).await;
    match build_static_map_request(
        &state.config.map,
        places.iter().map(ListedPlace::location),
        &view,
        observer,
    ) {
        Ok(req) => Json(req).into_response(),
        Err(ViewportError::Unconfigured) => map_unconfigured(),
    }
}

async fn get_me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match signed_in(&state, &headers) {
        Some(profile) => Json(profile).into_response(),
        None => sign_in_required(),
    }
}

async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(actor) = signed_in(&state, &headers) else {
        return sign_in_required();
    };
    if !actor.role.is_moderator() {
        return catalog_error_response(&CatalogError::Forbidden(
            "only moderators and admins can list users".to_string(),
        ));
    }
    let profiles = &state.profiles;
    Json(json!({
        "users": profiles.list(),
        "counts": {
            "admin": profiles.count_by_role(Role::Admin),
            "moderator": profiles.count_by_role(Role::Moderator),
            "user": profiles.count_by_role(Role::User),
        },
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

async fn set_role(
    State(state): State<AppState>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<RoleChange>,
) -> Response {
    let Some(actor) = signed_in(&state, &headers) else {
        return sign_in_required();
    };
    let target = UserId::new(target);
    match state.profiles.change_role(&actor.id, &target, body.role) {
        Ok(profile) => {
            info!("{} set role of {} to {:?}", actor.id, target, body.role);
            Json(profile).into_response()
        }
        Err(err) => catalog_error_response(&err),
    }
}

/// Profile of the caller named by the identity header, created on first use.
/// The header is trusted as-is; it must be set by an auth proxy in front of
/// the server, never by the client.
fn signed_in(state: &AppState, headers: &HeaderMap) -> Option<UserProfile> {
    let id = header_str(headers, USER_HEADER)?;
    let email = header_str(headers, EMAIL_HEADER).unwrap_or_default();
    Some(state.profiles.get_or_create(&UserId::new(id), email))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Both coordinates or neither.
fn observer_from(lat: Option<f64>, lng: Option<f64>) -> Result<Option<GeoPoint>, Response> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let p = GeoPoint::new(lat, lng);
            if p.is_valid() {
                Ok(Some(p))
            } else {
                Err(bad_request("coordinates out of range"))
            }
        }
        _ => Err(bad_request("lat and lng must be given together")),
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn sign_in_required() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "you must be signed in" })),
    )
        .into_response()
}

fn map_unconfigured() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "unconfigured",
            "error": ViewportError::Unconfigured.to_string(),
        })),
    )
        .into_response()
}

fn catalog_error_response(err: &CatalogError) -> Response {
    let status = match err {
        CatalogError::NotFound => StatusCode::NOT_FOUND,
        CatalogError::Invalid(_) => StatusCode::BAD_REQUEST,
        CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
        CatalogError::Backend(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
