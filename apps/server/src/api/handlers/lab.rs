//! Lab work orders, the lab price list, and lab inventory.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use dentaldesk_models::{NewInventoryItem, NewLabWork, NewLabWorkCost};
use serde::Deserialize;

use super::{created, deleted, found, merged, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::LabStore,
    state::AppState,
    Error, Result,
};

pub async fn list_lab_works(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_lab_works().await?)
}

pub async fn get_lab_work(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_lab_work(id).await?, "Lab work")?)
}

pub async fn create_lab_work(
    State(state): State<AppState>,
    ValidatedJson(work): ValidatedJson<NewLabWork>,
) -> Result<Response> {
    created(state.lab_service.create(work).await?)
}

pub async fn update_lab_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.lab_service.update(id, &patch).await?)
}

pub async fn delete_lab_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_lab_work(id).await?, "Lab work")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLookupQuery {
    pub work_type: Option<String>,
    pub technician: Option<String>,
}

/// The full price list, or a single row when `workType` is given.
pub async fn list_lab_work_costs(
    State(state): State<AppState>,
    Query(query): Query<CostLookupQuery>,
) -> Result<Response> {
    match query.work_type {
        Some(work_type) => {
            let cost = state
                .lab_service
                .lookup_cost(&work_type, query.technician.as_deref())
                .await?;
            ok(found(cost, "Lab work cost")?)
        }
        None if query.technician.is_some() => Err(Error::BadRequest(
            "workType is required when technician is given".to_string(),
        )),
        None => ok(state.store.list_lab_work_costs().await?),
    }
}

pub async fn get_lab_work_cost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_lab_work_cost(id).await?, "Lab work cost")?)
}

pub async fn create_lab_work_cost(
    State(state): State<AppState>,
    ValidatedJson(cost): ValidatedJson<NewLabWorkCost>,
) -> Result<Response> {
    created(state.store.create_lab_work_cost(cost).await?)
}

pub async fn update_lab_work_cost(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_lab_work_cost(id).await?, "Lab work cost")?;
    let cost = merged(&current.data, &patch)?;
    ok(found(
        state.store.update_lab_work_cost(id, cost).await?,
        "Lab work cost",
    )?)
}

pub async fn delete_lab_work_cost(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_lab_work_cost(id).await?, "Lab work cost")
}

pub async fn list_inventory(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_inventory().await?)
}

pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(
        state.store.get_inventory_item(id).await?,
        "Inventory item",
    )?)
}

pub async fn create_inventory_item(
    State(state): State<AppState>,
    ValidatedJson(item): ValidatedJson<NewInventoryItem>,
) -> Result<Response> {
    let item = state.store.create_inventory_item(item).await?;
    if item.is_low() {
        tracing::info!(item = %item.item_name, quantity = item.quantity, "Lab stock below threshold");
    }
    created(item)
}

pub async fn update_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(
        state.store.get_inventory_item(id).await?,
        "Inventory item",
    )?;
    let item = merged(&current.data, &patch)?;
    let item = found(
        state.store.update_inventory_item(id, item).await?,
        "Inventory item",
    )?;
    if item.is_low() {
        tracing::info!(item = %item.item_name, quantity = item.quantity, "Lab stock below threshold");
    }
    ok(item)
}

pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(
        state.store.delete_inventory_item(id).await?,
        "Inventory item",
    )
}
