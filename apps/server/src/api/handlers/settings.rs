use axum::{
    extract::{Path, State},
    response::Response,
};
use dentaldesk_models::NewSetting;

use super::{created, found, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::SettingsStore,
    state::AppState,
    Result,
};

pub async fn list_settings(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_settings().await?)
}

pub async fn list_settings_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Response> {
    ok(state.store.list_settings_by_category(&category).await?)
}

pub async fn get_setting_by_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response> {
    ok(found(state.store.get_setting_by_key(&key).await?, "Setting")?)
}

/// Values for the known keys must match that key's shape.
pub async fn create_setting(
    State(state): State<AppState>,
    ValidatedJson(setting): ValidatedJson<NewSetting>,
) -> Result<Response> {
    created(state.settings_service.create(setting).await?)
}

pub async fn update_setting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.settings_service.update(id, &patch).await?)
}
