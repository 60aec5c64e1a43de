use crate::api::handlers::settings;
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(settings::list_settings).post(settings::create_setting),
        )
        .route(
            "/settings/category/:category",
            get(settings::list_settings_by_category),
        )
        .route("/settings/key/:key", get(settings::get_setting_by_key))
        .route("/settings/:id", put(settings::update_setting))
}
