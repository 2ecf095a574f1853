//! Contact form handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::contact::{DEFAULT_SUBMISSION_PAGE_LIMIT, SubmitContactCommand};
use crate::application::pagination::PageRequest;

use super::contact_to_api;
use crate::infra::http::api::client::ClientMeta;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn submit_contact(
    State(state): State<ApiState>,
    client: ClientMeta,
    Json(payload): Json<ContactSubmitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = SubmitContactCommand {
        name: payload.name,
        email: payload.email,
        subject: payload.subject,
        message: payload.message,
        inquiry_type: payload.inquiry_type,
        ip_address: client.ip_address,
        user_agent: client.user_agent,
    };

    let submission = state
        .contact
        .submit(command)
        .await
        .map_err(contact_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(ContactSubmitResponse {
            success: true,
            message: "Thank you for your message! We'll get back to you soon.",
            submission_id: submission.id,
        }),
    ))
}

pub async fn list_submissions(
    State(state): State<ApiState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        DEFAULT_SUBMISSION_PAGE_LIMIT,
    );
    let page = state
        .contact
        .list(query.status.as_deref(), query.inquiry_type.as_deref(), page)
        .await
        .map_err(contact_to_api)?;

    Ok(Json(SubmissionsResponse {
        success: true,
        page,
    }))
}

pub async fn get_submission(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = state.contact.get(id).await.map_err(contact_to_api)?;
    Ok(Json(SubmissionResponse {
        success: true,
        message: None,
        submission,
    }))
}

pub async fn update_submission_status(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let submission = state
        .contact
        .update_status(id, &payload.status)
        .await
        .map_err(contact_to_api)?;

    Ok(Json(SubmissionResponse {
        success: true,
        message: Some("Status updated successfully"),
        submission,
    }))
}

pub async fn delete_submission(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.contact.delete(id).await.map_err(contact_to_api)?;
    Ok(Json(MessageResponse::new("Submission deleted successfully")))
}

pub async fn contact_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.contact.stats().await.map_err(contact_to_api)?;
    Ok(Json(ContactStatsResponse {
        success: true,
        stats,
    }))
}
