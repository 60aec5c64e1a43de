//! Route tables, mounted under `/api`.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod clinical;
pub mod lab;
pub mod patients;
pub mod settings;
pub mod staff;

use crate::state::AppState;
use axum::Router;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::auth_routes())
        .merge(patients::patient_routes())
        .merge(clinical::clinical_routes())
        .merge(lab::lab_routes())
        .merge(staff::staff_routes())
        .merge(billing::billing_routes())
        .merge(settings::settings_routes())
        .nest("/admin", admin::admin_routes())
}
