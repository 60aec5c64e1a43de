//! Register, login, logout, and the current-user probe.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dentaldesk_models::{NewUser, PublicUser};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    api::extract::ValidatedJson,
    auth::is_https,
    state::AppState,
    Result,
};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Creates the account and logs it in.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(new_user): ValidatedJson<NewUser>,
) -> Result<Response> {
    let user = state.sessions.register(new_user).await?;
    let cookie = state.sessions.start_session(&user, is_https(&headers)).await?;

    let mut response = (StatusCode::CREATED, Json(PublicUser::from(&user))).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response> {
    let user = state
        .sessions
        .authenticate(&request.username, &request.password)
        .await?;
    let cookie = state.sessions.start_session(&user, is_https(&headers)).await?;
    tracing::info!(user_id = user.id, "User logged in");

    let mut response = (StatusCode::OK, Json(PublicUser::from(&user))).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    state.sessions.end_session(&headers).await?;

    let mut response = (
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        state.sessions.clear_session_cookie(is_https(&headers)),
    );
    Ok(response)
}

pub async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.sessions.current_user(&headers).await {
        Ok(user) => (StatusCode::OK, Json(PublicUser::from(&user))).into_response(),
        Err(e) => e.into_response(),
    }
}
