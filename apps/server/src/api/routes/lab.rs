use crate::api::handlers::lab;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn lab_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lab-works",
            get(lab::list_lab_works).post(lab::create_lab_work),
        )
        .route(
            "/lab-works/:id",
            get(lab::get_lab_work)
                .put(lab::update_lab_work)
                .delete(lab::delete_lab_work),
        )
        // Price list; `?workType=&technician=` selects one row
        .route(
            "/lab-work-costs",
            get(lab::list_lab_work_costs).post(lab::create_lab_work_cost),
        )
        .route(
            "/lab-work-costs/:id",
            get(lab::get_lab_work_cost)
                .put(lab::update_lab_work_cost)
                .delete(lab::delete_lab_work_cost),
        )
        .route(
            "/lab-inventory",
            get(lab::list_inventory).post(lab::create_inventory_item),
        )
        .route(
            "/lab-inventory/:id",
            get(lab::get_inventory_item)
                .put(lab::update_inventory_item)
                .delete(lab::delete_inventory_item),
        )
}
