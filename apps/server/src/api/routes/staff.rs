use crate::api::handlers::staff;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/staff", get(staff::list_staff).post(staff::create_staff))
        .route(
            "/staff/:id",
            get(staff::get_staff)
                .put(staff::update_staff)
                .delete(staff::delete_staff),
        )
        .route("/staff/:id/attendance", get(staff::list_staff_attendance))
        .route("/staff/:id/salary", get(staff::list_staff_salary))
        .route("/attendance", post(staff::create_attendance))
        .route(
            "/attendance/:id",
            put(staff::update_attendance).delete(staff::delete_attendance),
        )
        .route("/salary", post(staff::create_salary))
        .route(
            "/salary/:id",
            put(staff::update_salary).delete(staff::delete_salary),
        )
}
