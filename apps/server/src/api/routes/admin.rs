use crate::api::handlers::billing;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // Development only; 403 elsewhere
        .route(
            "/reset-invoice-sequence",
            post(billing::reset_invoice_sequence),
        )
}
