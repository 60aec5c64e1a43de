//! HTTP API layer

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;

use crate::{auth::session_middleware, config::ServerConfig, state::AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

/// Build the full application router.
///
/// Layout:
/// - `/health`: liveness
/// - `/api/*`: the clinic API, behind the session gate
/// - `/uploads/*`: uploaded attachments, read-only
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let api = routes::api_routes().layer(from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&config.uploads.directory))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(request_body_limit(&config)))
        .layer(cors_layer(&config.server))
        .layer(CompressionLayer::new())
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Large enough for a JSON body or a multipart upload of several files.
fn request_body_limit(config: &crate::Config) -> usize {
    config
        .server
        .max_request_body_size
        .max(config.uploads.max_file_size)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT];

    if server.cors_origins.iter().any(|o| o == "*") {
        // Credentials cannot be combined with a wildcard origin.
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}
