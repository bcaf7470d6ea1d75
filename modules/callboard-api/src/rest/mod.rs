use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::warn;

use callboard_common::{CallboardError, EventPatch};

use crate::auth::Caller;
use crate::AppState;

// --- Request bodies ---

#[derive(Deserialize)]
pub struct CredentialsBody {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEventBody {
    slug: Option<String>,
}

// --- Error mapping ---

/// Map the error taxonomy onto HTTP. Store failures are logged and
/// returned as a bare 500 so backend details never reach a caller; every
/// other rejection carries its message so auth failure, not-found, and
/// validation failure stay distinguishable.
fn error_response(e: &CallboardError) -> Response {
    let status = match e {
        CallboardError::NotFound => StatusCode::NOT_FOUND,
        CallboardError::AlreadyExists => StatusCode::CONFLICT,
        CallboardError::InvalidSlug(_)
        | CallboardError::Validation(_)
        | CallboardError::ReservedSlug => StatusCode::BAD_REQUEST,
        CallboardError::Unauthorized | CallboardError::InvalidCredentials => {
            StatusCode::UNAUTHORIZED
        }
        CallboardError::Forbidden => StatusCode::FORBIDDEN,
        CallboardError::Store(detail) => {
            warn!(error = %detail, "store failure");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

// --- Handlers ---

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Caller(identity): Caller,
) -> impl IntoResponse {
    match state.access.view(&slug, &identity).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn post_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Caller(identity): Caller,
    Json(patch): Json<EventPatch>,
) -> impl IntoResponse {
    match state.access.update(&slug, &identity, patch).await {
        Ok(event) => Json(event).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> impl IntoResponse {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return error_response(&CallboardError::Validation(
            "username and password are required".to_string(),
        ));
    };
    match state.accounts.register(&username, &password).await {
        Ok(username) => Json(serde_json::json!({ "username": username })).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> impl IntoResponse {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return error_response(&CallboardError::Validation(
            "username and password are required".to_string(),
        ));
    };
    match state.accounts.login(&username, &password).await {
        Ok(username) => Json(serde_json::json!({ "username": username })).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn owned_events(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
) -> impl IntoResponse {
    match state.access.list_owned(&identity).await {
        Ok(events) => Json(events).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    Caller(identity): Caller,
    Json(body): Json<CreateEventBody>,
) -> impl IntoResponse {
    let slug = body.slug.unwrap_or_default();
    match state.access.create(&slug, &identity).await {
        Ok(event) => Json(event).into_response(),
        Err(e) => error_response(&e),
    }
}
