use crate::api::handlers::{appointments, pharmacy, uploads, visits};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn clinical_routes() -> Router<AppState> {
    Router::new()
        // Visits
        .route("/visits", post(visits::create_visit))
        .route(
            "/visits/:id",
            get(visits::get_visit)
                .put(visits::update_visit)
                .delete(visits::delete_visit),
        )
        .route("/visits/:id/follow-up", post(visits::create_follow_up))
        .route("/visits/:id/follow-ups", get(visits::list_follow_ups))
        .route("/visits/:id/invoices", get(visits::list_visit_invoices))
        .route(
            "/visits/:id/prescriptions",
            get(visits::list_visit_prescriptions),
        )
        .route(
            "/visits/:id/attachments/:index",
            delete(visits::delete_attachment),
        )
        .route(
            "/visits/:id/consent-forms/:index",
            delete(visits::delete_consent_form),
        )
        .route("/visits/:id/media/:file_id", delete(visits::delete_media))
        // Appointments
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/:id",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        // Pharmacy
        .route(
            "/medications",
            get(pharmacy::list_medications).post(pharmacy::create_medication),
        )
        .route(
            "/medications/:id",
            get(pharmacy::get_medication)
                .put(pharmacy::update_medication)
                .delete(pharmacy::delete_medication),
        )
        .route("/prescriptions", post(pharmacy::create_prescription))
        .route(
            "/prescriptions/:id",
            get(pharmacy::get_prescription)
                .put(pharmacy::update_prescription)
                .delete(pharmacy::delete_prescription),
        )
        // Uploads
        .route("/upload/logo", post(uploads::upload_logo))
        .route(
            "/upload/patient-attachment",
            post(uploads::upload_patient_attachment),
        )
        .route("/upload/media", post(uploads::upload_media))
}
