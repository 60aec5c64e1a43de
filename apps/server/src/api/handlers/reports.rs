use axum::{
    extract::{Query, State},
    response::Response,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::ok;
use crate::{state::AppState, Error, Result};

#[derive(Debug, Deserialize)]
pub struct RevenueQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => dentaldesk_models::dates::parse(s)
            .map(Some)
            .map_err(|e| Error::BadRequest(format!("Invalid '{name}' date: {e}"))),
    }
}

pub async fn revenue(
    State(state): State<AppState>,
    Query(query): Query<RevenueQuery>,
) -> Result<Response> {
    let from = parse_bound("from", query.from.as_deref())?;
    let to = parse_bound("to", query.to.as_deref())?;
    ok(state.invoice_service.revenue(from, to).await?)
}
