//! Request handlers, one module per clinic area.

pub mod appointments;
pub mod auth;
pub mod billing;
pub mod health;
pub mod lab;
pub mod patients;
pub mod pharmacy;
pub mod reports;
pub mod settings;
pub mod staff;
pub mod uploads;
pub mod visits;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dentaldesk_models::apply_patch;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value as JsonValue};
use validator::Validate;

use crate::{Error, Result};

/// Merge an update body over the stored fields and re-validate the result.
pub(crate) fn merged<T>(current: &T, patch: &JsonValue) -> Result<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    let merged: T = apply_patch(current, patch)?;
    merged.validate()?;
    Ok(merged)
}

pub(crate) fn found<T>(value: Option<T>, entity: &str) -> Result<T> {
    value.ok_or_else(|| Error::not_found(entity))
}

pub(crate) fn ok<T: Serialize>(value: T) -> Result<Response> {
    Ok((StatusCode::OK, Json(value)).into_response())
}

pub(crate) fn created<T: Serialize>(value: T) -> Result<Response> {
    Ok((StatusCode::CREATED, Json(value)).into_response())
}

/// 204 when the row existed, 404 otherwise.
pub(crate) fn deleted(removed: bool, entity: &str) -> Result<Response> {
    if removed {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(Error::not_found(entity))
    }
}

pub(crate) fn message(text: impl Into<String>) -> Result<Response> {
    Ok((StatusCode::OK, Json(json!({ "message": text.into() }))).into_response())
}
