use crate::api::handlers::patients;
use crate::state::AppState;
use axum::{routing::get, Router};

/// `:id` is the numeric row id for PUT/DELETE and the human patient ID for PATCH and the
/// nested lists; GET accepts either.
pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/patientId/:patient_id",
            get(patients::get_patient_by_patient_id),
        )
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .patch(patients::patch_patient)
                .delete(patients::delete_patient),
        )
        .route("/patients/:id/visits", get(patients::list_patient_visits))
        .route(
            "/patients/:id/lab-works",
            get(patients::list_patient_lab_works),
        )
        .route(
            "/patients/:id/invoices",
            get(patients::list_patient_invoices),
        )
        .route(
            "/patients/:id/appointments",
            get(patients::list_patient_appointments),
        )
}
