use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::AppState;
use crate::profile_store::{HistoryEntry, Profile};
use crate::recipe::{RecipeRequest, Recommendation};

pub(super) enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// Body that axum could not read as the expected JSON; keeps axum's status code.
    InvalidBody(JsonRejection),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Internal(err) => {
                error!(error = %format!("{:#}", err), "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn unknown_user(username: &str) -> ApiError {
    ApiError::NotFound(format!("unknown user '{}'", username))
}

#[derive(Deserialize)]
pub(super) struct LoginRequest {
    username: String,
}

#[derive(Deserialize)]
pub(super) struct PantryUpdate {
    items: Vec<String>,
    #[serde(default)]
    add: bool,
}

#[derive(Deserialize)]
pub(super) struct PreferencesUpdate {
    diet: Option<Vec<String>>,
    allergies: Option<Vec<String>>,
    constraints: Option<String>,
}

/// GET /api/health
pub(super) async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let profiles = state.store.lock().await.len();
    Json(json!({ "status": "ok", "profiles": profiles }))
}

/// POST /api/login
///
/// Creates the profile on first login.
pub(super) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(req) = body?;
    let username = req.username.trim();
    if username.is_empty() {
        return Err(ApiError::BadRequest("username must not be empty".to_string()));
    }
    let mut store = state.store.lock().await;
    let created = store.get(username).is_none();
    let profile = store.get_or_create(username).clone();
    if created {
        store.save()?;
    }
    info!(username, created, "login");
    Ok(Json(profile))
}

/// GET /api/profiles/{username}
pub(super) async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Profile> {
    let store = state.store.lock().await;
    store
        .get(&username)
        .cloned()
        .map(Json)
        .ok_or_else(|| unknown_user(&username))
}

/// PUT /api/profiles/{username}/pantry
pub(super) async fn update_pantry(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<PantryUpdate>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(update) = body?;
    let mut store = state.store.lock().await;
    let profile = store.get_mut(&username).ok_or_else(|| unknown_user(&username))?;
    if update.add {
        profile.add_to_pantry(&update.items);
    } else {
        profile.set_pantry(&update.items);
    }
    let profile = profile.clone();
    store.save()?;
    info!(%username, items = profile.pantry.len(), "pantry saved");
    Ok(Json(profile))
}

/// PUT /api/profiles/{username}/preferences. Absent fields are left unchanged.
pub(super) async fn update_preferences(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<PreferencesUpdate>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(update) = body?;
    let mut store = state.store.lock().await;
    let profile = store.get_mut(&username).ok_or_else(|| unknown_user(&username))?;
    if let Some(diet) = &update.diet {
        profile.set_preferences(diet);
    }
    if let Some(allergies) = &update.allergies {
        profile.set_allergies(allergies);
    }
    if let Some(constraints) = &update.constraints {
        profile.set_constraints(constraints);
    }
    let profile = profile.clone();
    store.save()?;
    info!(%username, "profile saved");
    Ok(Json(profile))
}

/// POST /api/profiles/{username}/recommendations
///
/// The store lock is released while the model runs. A failed save is logged and the
/// recommendation is still returned.
pub(super) async fn recommend(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Result<Json<RecipeRequest>, JsonRejection>,
) -> ApiResult<Recommendation> {
    let Json(request) = body?;
    let snapshot = {
        let store = state.store.lock().await;
        store.get(&username).cloned().ok_or_else(|| unknown_user(&username))?
    };

    let recommendation = state.recommender.recommend_for(&snapshot, &request).await;

    let mut store = state.store.lock().await;
    if let Some(profile) = store.get_mut(&username) {
        profile.record(request.normalized(), &recommendation);
        if let Err(e) = store.save() {
            warn!(%username, error = %format!("{:#}", e), "could not persist history");
        }
    }
    Ok(Json(recommendation))
}

/// GET /api/profiles/{username}/history
pub(super) async fn history(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Vec<HistoryEntry>> {
    let store = state.store.lock().await;
    store
        .get(&username)
        .map(|profile| Json(profile.history.clone()))
        .ok_or_else(|| unknown_user(&username))
}
