//! Invoices, invoice line items, and the development-only sequence reset.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dentaldesk_models::{NewInvoice, NewInvoiceItem};

use super::{created, deleted, found, merged, message, ok};
use crate::{
    api::extract::{parse_id, PatchBody, ValidatedJson},
    db::BillingStore,
    state::AppState,
    Error, Result,
};

pub async fn list_invoices(State(state): State<AppState>) -> Result<Response> {
    ok(state.store.list_invoices().await?)
}

pub async fn get_invoice(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(found(state.store.get_invoice(id).await?, "Invoice")?)
}

pub async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(invoice): ValidatedJson<NewInvoice>,
) -> Result<Response> {
    let invoice = state.store.create_invoice(invoice).await?;
    tracing::info!(invoice_id = invoice.id, patient_id = %invoice.patient_id, "Invoice created");
    created(invoice)
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.invoice_service.update(id, &patch).await?)
}

/// Partial update that also stamps or clears the payment fields on status changes.
pub async fn patch_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.invoice_service.patch(id, &patch).await?)
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    state.invoice_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn list_invoice_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    ok(state.store.list_invoice_items(id).await?)
}

pub async fn create_invoice_item(
    State(state): State<AppState>,
    ValidatedJson(item): ValidatedJson<NewInvoiceItem>,
) -> Result<Response> {
    found(state.store.get_invoice(item.invoice_id).await?, "Invoice")?;
    created(state.store.create_invoice_item(item).await?)
}

pub async fn update_invoice_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    PatchBody(patch): PatchBody,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let current = found(state.store.get_invoice_item(id).await?, "Invoice item")?;
    let item = merged(&current.data, &patch)?;
    ok(found(
        state.store.update_invoice_item(id, item).await?,
        "Invoice item",
    )?)
}

pub async fn delete_invoice_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = parse_id(&id)?;
    deleted(state.store.delete_invoice_item(id).await?, "Invoice item")
}

pub async fn reset_invoice_sequence(State(state): State<AppState>) -> Result<Response> {
    if !state.config.is_development() {
        return Err(Error::Forbidden(
            "This operation is only allowed in development mode".to_string(),
        ));
    }
    state.store.reset_invoice_sequence().await?;
    tracing::warn!("Invoice sequence reset");
    message("Invoice sequence reset successfully")
}
