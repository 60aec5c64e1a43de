use axum::{
    extract::{Path, State},
    response::Response,
};
use dentaldesk_models::NewPatient;

use super::{created, deleted, found, merged, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::{AppointmentStore, BillingStore, LabStore, PatientStore, VisitStore},
    state::AppState,
    Result,
};

pub async fn list_patients(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_patients().await?)
}

/// Looks up by patient ID first, then by numeric row id.
pub async fn get_patient(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    ok(state.patient_service.find(&id).await?)
}

pub async fn get_patient_by_patient_id(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Response> {
    let patient = state.store.get_patient_by_patient_id(&patient_id).await?;
    ok(found(patient, "Patient")?)
}

pub async fn create_patient(
    State(state): State<AppState>,
    ValidatedJson(patient): ValidatedJson<NewPatient>,
) -> Result<Response> {
    created(state.patient_service.create(patient).await?)
}

pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_patient(id).await?, "Patient")?;
    let patient = merged(&current.data, &patch)?;
    ok(found(state.store.update_patient(id, patient).await?, "Patient")?)
}

/// `PATCH /patients/:patientId` addresses the patient by its human ID.
pub async fn patch_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let current = found(
        state.store.get_patient_by_patient_id(&patient_id).await?,
        "Patient",
    )?;
    let patient = merged(&current.data, &patch)?;
    ok(found(
        state.store.update_patient(current.id, patient).await?,
        "Patient",
    )?)
}

pub async fn delete_patient(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_patient(id).await?, "Patient")
}

pub async fn list_patient_visits(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Response> {
    ok(state.store.list_visits_by_patient(&patient_id).await?)
}

pub async fn list_patient_lab_works(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Response> {
    ok(state.store.list_lab_works_by_patient(&patient_id).await?)
}

pub async fn list_patient_invoices(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Response> {
    ok(state.store.list_invoices_by_patient(&patient_id).await?)
}

pub async fn list_patient_appointments(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Response> {
    ok(state.store.list_appointments_by_patient(&patient_id).await?)
}
