use axum::{
    extract::{Path, State},
    response::Response,
};
use dentaldesk_models::NewVisit;

use super::{created, deleted, message, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::{BillingStore, PharmacyStore, VisitStore},
    services::VisitList,
    state::AppState,
    Error, Result,
};

pub async fn get_visit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.visit_service.get(id).await?)
}

pub async fn create_visit(
    State(state): State<AppState>,
    ValidatedJson(visit): ValidatedJson<NewVisit>,
) -> Result<Response> {
    created(state.store.create_visit(visit).await?)
}

pub async fn update_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.visit_service.update(id, &patch).await?)
}

pub async fn delete_visit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_visit(id).await?, "Visit")
}

pub async fn create_follow_up(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    created(state.visit_service.create_follow_up(id).await?)
}

pub async fn list_follow_ups(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.visit_service.follow_ups(id).await?)
}

pub async fn list_visit_invoices(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.store.list_invoices_by_visit(id).await?)
}

pub async fn list_visit_prescriptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.store.list_prescriptions_by_visit(id).await?)
}

fn parse_index(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| Error::BadRequest("Invalid visit ID or index".to_string()))
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let index = parse_index(&index)?;
    state
        .visit_service
        .remove_entry(id, VisitList::Attachments, index)
        .await?;
    message("Attachment deleted successfully")
}

pub async fn delete_consent_form(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let index = parse_index(&index)?;
    state
        .visit_service
        .remove_entry(id, VisitList::ConsentForms, index)
        .await?;
    message("Consent form deleted successfully")
}

pub async fn delete_media(
    State(state): State<AppState>,
    Path((id, file_id)): Path<(String, String)>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    state.upload_service.remove_media(id, &file_id).await?;
    message("File deleted successfully")
}
