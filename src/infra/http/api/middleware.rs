use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::application::admin_token::AdminAuthError;

use super::client::ClientMeta;
use super::error::ApiError;
use super::state::ApiState;

pub async fn admin_auth(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(admin_token) = state.admin_token.as_ref() else {
        return ApiError::admin_disabled().into_response();
    };

    let token =
        extract_token(request.headers().get(axum::http::header::AUTHORIZATION)).or_else(|| {
            request
                .headers()
                .get("x-api-key")
                .and_then(|v| v.to_str().ok().map(|s| s.to_string()))
        });

    match admin_token.verify(token.as_deref()) {
        Ok(()) => next.run(request).await,
        Err(AdminAuthError::Missing) => ApiError::unauthorized().into_response(),
        Err(AdminAuthError::Invalid) => {
            warn!(
                target = "pinkdreams::api::auth",
                path = %request.uri().path(),
                "rejected admin request with invalid token"
            );
            ApiError::unauthorized().into_response()
        }
    }
}

pub async fn form_rate_limit(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let (parts, body) = request.into_parts();
    let client = ClientMeta::from_parts(&parts);
    let request = Request::from_parts(parts, body);

    if !state.rate_limiter.allow(&client.ip_address, &path) {
        warn!(
            target = "pinkdreams::api::ratelimit",
            client = %client.ip_address,
            path = %path,
            limit = state.rate_limiter.limit(),
            "public form rate limit exceeded"
        );
        return ApiError::rate_limited(state.rate_limiter.retry_after_secs());
    }

    next.run(request).await
}

fn extract_token(header: Option<&axum::http::HeaderValue>) -> Option<String> {
    let raw = header?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?;
    Some(bearer.to_string())
}
