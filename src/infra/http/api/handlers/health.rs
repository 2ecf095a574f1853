use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::infra::http::api::state::ApiState;

pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let report = state.health.check().await;
    let status = if report.is_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
