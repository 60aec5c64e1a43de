use axum::{
    extract::{Path, State},
    response::Response,
};
use dentaldesk_models::{NewMedication, NewPrescription};

use super::{created, deleted, found, merged, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::PharmacyStore,
    state::AppState,
    Error, Result,
};

pub async fn list_medications(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_medications().await?)
}

pub async fn get_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_medication(id).await?, "Medication")?)
}

pub async fn create_medication(
    State(state): State<AppState>,
    ValidatedJson(medication): ValidatedJson<NewMedication>,
) -> Result<Response> {
    if state
        .store
        .get_medication_by_name(&medication.name)
        .await?
        .is_some()
    {
        return Err(Error::Conflict(format!(
            "Medication '{}' already exists",
            medication.name
        )));
    }
    created(state.store.create_medication(medication).await?)
}

pub async fn update_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_medication(id).await?, "Medication")?;
    let medication: NewMedication = merged(&current.data, &patch)?;
    if medication.name != current.name {
        if let Some(other) = state.store.get_medication_by_name(&medication.name).await? {
            if other.id != id {
                return Err(Error::Conflict(format!(
                    "Medication '{}' already exists",
                    medication.name
                )));
            }
        }
    }
    ok(found(
        state.store.update_medication(id, medication).await?,
        "Medication",
    )?)
}

pub async fn delete_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_medication(id).await?, "Medication")
}

pub async fn get_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_prescription(id).await?, "Prescription")?)
}

pub async fn create_prescription(
    State(state): State<AppState>,
    ValidatedJson(prescription): ValidatedJson<NewPrescription>,
) -> Result<Response> {
    created(state.store.create_prescription(prescription).await?)
}

pub async fn update_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_prescription(id).await?, "Prescription")?;
    let prescription = merged(&current.data, &patch)?;
    ok(found(
        state.store.update_prescription(id, prescription).await?,
        "Prescription",
    )?)
}

pub async fn delete_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_prescription(id).await?, "Prescription")
}
