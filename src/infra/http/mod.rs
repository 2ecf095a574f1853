pub mod api;
pub mod middleware;

pub use api::rate_limit::FormRateLimiter;
pub use api::{ApiState, build_api_router};

use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{Router, middleware as axum_middleware};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::CorsSettings;

/// The full HTTP surface: storefront API routes wrapped in request ids,
/// response logging and CORS.
pub fn build_router(state: ApiState, cors: &CorsSettings) -> Router {
    build_api_router(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
        .layer(build_cors_layer(cors))
}

fn build_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static("x-api-key"),
            middleware::REQUEST_ID_HEADER,
        ])
        .expose_headers([RETRY_AFTER, middleware::REQUEST_ID_HEADER]);

    if settings.allowed_origins.is_empty() {
        info!(target = "pinkdreams::http::cors", "allowing any origin");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(target = "pinkdreams::http::cors", origin = %origin, "skipping unusable origin");
                None
            }
        })
        .collect();
    info!(
        target = "pinkdreams::http::cors",
        origins = ?settings.allowed_origins,
        "restricting cross-origin requests"
    );
    cors.allow_origin(origins)
}
