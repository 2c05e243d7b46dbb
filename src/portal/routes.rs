use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::google_login::{complete_login, start_login, GoogleCallback};
use super::oauth::token_info::validate_token;
use super::pages;
use crate::app::app_state::PortalState;
use crate::infra::settings::GOOGLE_CALLBACK_PATH;
use crate::shared::error::AppError;
use crate::shared::time::now_unix_seconds;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app: &'static str,
    version: &'static str,
    ts: i64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "tenxr-web-portal",
        version: env!("CARGO_PKG_VERSION"),
        ts: now_unix_seconds(),
    })
}

async fn landing(State(state): State<PortalState>) -> Html<String> {
    Html(pages::render_landing(&state.settings.app_name))
}

/// Query pairs in request order. Repeated keys are kept so lookups can take the first one.
type QueryPairs = Vec<(String, String)>;

/// First value for `key`, the way a browser's `URLSearchParams::get` reads a repeated parameter.
fn first_param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn auth_callback(
    State(state): State<PortalState>,
    Query(pairs): Query<QueryPairs>,
) -> Html<String> {
    let deep_link = first_param(&pairs, "token")
        .filter(|t| !t.is_empty())
        .map(|t| state.deep_link.with_token(t));
    if deep_link.is_none() {
        tracing::debug!("auth callback without token; nothing to hand off");
    }
    Html(pages::render_redirect(
        &state.settings.app_name,
        deep_link.as_deref(),
    ))
}

async fn app_google_auth(
    State(state): State<PortalState>,
    Query(pairs): Query<QueryPairs>,
) -> Response {
    let app_name = state.settings.app_name.as_str();
    if first_param(&pairs, "fromDesktopApp") != Some("true") {
        return Html(pages::render_connecting(app_name)).into_response();
    }

    match start_login(&state) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(err) => error_page(app_name, &err),
    }
}

async fn app_google_auth_callback(
    State(state): State<PortalState>,
    Query(pairs): Query<QueryPairs>,
) -> Response {
    let app_name = state.settings.app_name.as_str();
    let param = |key: &str| first_param(&pairs, key).map(str::to_string);
    let callback = GoogleCallback {
        code: param("code"),
        state: param("state"),
        error: param("error"),
        error_description: param("error_description"),
    };
    match complete_login(&state, &callback).await {
        Ok(done) => Html(pages::render_success(
            app_name,
            &done.user.name,
            &done.deep_link,
        ))
        .into_response(),
        Err(err) => error_page(app_name, &err),
    }
}

#[derive(Debug, Deserialize)]
struct ValidateTokenRequest {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct ValidateTokenResponse {
    valid: bool,
}

async fn validate_access_token(
    State(state): State<PortalState>,
    body: Result<Json<ValidateTokenRequest>, JsonRejection>,
) -> Result<Json<ValidateTokenResponse>, AppError> {
    let Json(req) = body.map_err(|rejection| {
        let detail = rejection.body_text();
        tracing::warn!(status = rejection.status().as_u16(), "validate request rejected: {detail}");
        AppError::new("SEC_INVALID_INPUT", format!("invalid validate request: {detail}"))
    })?;
    let valid = validate_token(
        &state.client,
        &state.provider.endpoints().tokeninfo_url,
        &req.access_token,
    )
    .await;
    Ok(Json(ValidateTokenResponse { valid }))
}

fn error_page(app_name: &str, err: &AppError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(code = err.code(), "desktop sign-in failed: {}", err.message());
    } else {
        tracing::warn!(code = err.code(), "desktop sign-in rejected: {}", err.message());
    }
    let message = if status == StatusCode::BAD_GATEWAY {
        "Google sign-in could not be completed. Please try again from the app."
    } else {
        err.message()
    };
    (
        status,
        Html(pages::render_error(app_name, err.code(), message)),
    )
        .into_response()
}

pub(crate) fn build_router(state: PortalState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health))
        .route("/auth/callback", get(auth_callback))
        .route("/login/app-google-auth", get(app_google_auth))
        .route(GOOGLE_CALLBACK_PATH, get(app_google_auth_callback))
        .route("/api/auth/validate", post(validate_access_token))
        .with_state(state)
}
