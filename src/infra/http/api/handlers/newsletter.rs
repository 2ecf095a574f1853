//! Newsletter handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::newsletter::{
    DEFAULT_SUBSCRIBER_PAGE_LIMIT, SubscribeCommand, SubscribeOutcome, UnsubscribeOutcome,
};
use crate::application::pagination::PageRequest;

use super::newsletter_to_api;
use crate::infra::http::api::client::ClientMeta;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn subscribe(
    State(state): State<ApiState>,
    client: ClientMeta,
    Json(payload): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = SubscribeCommand {
        email: payload.email,
        name: payload.name,
        source: payload.source,
        ip_address: client.ip_address,
        user_agent: client.user_agent,
    };

    let outcome = state
        .newsletter
        .subscribe(command)
        .await
        .map_err(newsletter_to_api)?;

    let response = match outcome {
        SubscribeOutcome::Subscribed(subscriber) => (
            StatusCode::CREATED,
            SubscribeResponse {
                success: true,
                message: "Successfully subscribed to newsletter",
                already_subscribed: false,
                subscriber: Some(subscriber),
            },
        ),
        SubscribeOutcome::Resubscribed(subscriber) => (
            StatusCode::OK,
            SubscribeResponse {
                success: true,
                message: "Welcome back! Your subscription has been reactivated",
                already_subscribed: false,
                subscriber: Some(subscriber),
            },
        ),
        SubscribeOutcome::AlreadySubscribed => (
            StatusCode::OK,
            SubscribeResponse {
                success: true,
                message: "You are already subscribed to our newsletter",
                already_subscribed: true,
                subscriber: None,
            },
        ),
    };

    Ok((response.0, Json(response.1)))
}

pub async fn unsubscribe(
    State(state): State<ApiState>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .newsletter
        .unsubscribe(&payload.email)
        .await
        .map_err(newsletter_to_api)?;

    let message = match outcome {
        UnsubscribeOutcome::Unsubscribed => "Successfully unsubscribed from newsletter",
        UnsubscribeOutcome::AlreadyUnsubscribed => "Email is already unsubscribed",
    };
    Ok(Json(MessageResponse::new(message)))
}

pub async fn update_preferences(
    State(state): State<ApiState>,
    Json(payload): Json<PreferencesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let preferences = state
        .newsletter
        .update_preferences(&payload.email, payload.preferences)
        .await
        .map_err(newsletter_to_api)?;

    Ok(Json(PreferencesResponse {
        success: true,
        message: "Preferences updated successfully",
        preferences,
    }))
}

pub async fn newsletter_stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.newsletter.stats().await.map_err(newsletter_to_api)?;
    Ok(Json(NewsletterStatsResponse {
        success: true,
        stats,
    }))
}

pub async fn list_subscribers(
    State(state): State<ApiState>,
    Query(query): Query<SubscriberListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        DEFAULT_SUBSCRIBER_PAGE_LIMIT,
    );
    let page = state
        .newsletter
        .list_subscribers(query.status.as_deref(), page)
        .await
        .map_err(newsletter_to_api)?;

    Ok(Json(SubscribersResponse {
        success: true,
        page,
    }))
}
