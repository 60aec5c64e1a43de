use axum::{
    extract::{Path, State},
    response::Response,
};
use dentaldesk_models::NewAppointment;

use super::{created, deleted, found, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::AppointmentStore,
    state::AppState,
    Result,
};

pub async fn list_appointments(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_appointments().await?)
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_appointment(id).await?, "Appointment")?)
}

/// Books the appointment together with its visit and consultation invoice.
pub async fn create_appointment(
    State(state): State<AppState>,
    ValidatedJson(appointment): ValidatedJson<NewAppointment>,
) -> Result<Response> {
    created(state.appointment_service.create(appointment).await?)
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.appointment_service.update(id, &patch).await?)
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_appointment(id).await?, "Appointment")
}
