use crate::api::handlers::{billing, reports};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/invoices",
            get(billing::list_invoices).post(billing::create_invoice),
        )
        .route(
            "/invoices/:id",
            get(billing::get_invoice)
                .put(billing::update_invoice)
                .patch(billing::patch_invoice)
                .delete(billing::delete_invoice),
        )
        .route("/invoices/:id/items", get(billing::list_invoice_items))
        .route("/invoice-items", post(billing::create_invoice_item))
        .route(
            "/invoice-items/:id",
            put(billing::update_invoice_item).delete(billing::delete_invoice_item),
        )
        .route("/reports/revenue", get(reports::revenue))
}
