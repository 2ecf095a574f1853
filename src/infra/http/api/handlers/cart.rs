//! Cart handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::cart_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn get_cart(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state.cart.get(&user_id).await.map_err(cart_to_api)?;
    Ok(Json(CartResponse::new(None, cart)))
}

pub async fn add_to_cart(
    State(state): State<ApiState>,
    Json(payload): Json<CartAddRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .cart
        .add(
            &payload.user_id,
            payload.product_id,
            payload.quantity,
            payload.price,
        )
        .await
        .map_err(cart_to_api)?;
    Ok(Json(CartResponse::new(Some("Item added to cart"), cart)))
}

pub async fn update_cart_item(
    State(state): State<ApiState>,
    Json(payload): Json<CartUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .cart
        .update(&payload.user_id, payload.product_id, payload.quantity)
        .await
        .map_err(cart_to_api)?;
    Ok(Json(CartResponse::new(Some("Cart updated"), cart)))
}

pub async fn remove_from_cart(
    State(state): State<ApiState>,
    Json(payload): Json<ProductRef>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .cart
        .remove(&payload.user_id, payload.product_id)
        .await
        .map_err(cart_to_api)?;
    Ok(Json(CartResponse::new(Some("Item removed from cart"), cart)))
}

pub async fn clear_cart(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state.cart.clear(&user_id).await.map_err(cart_to_api)?;
    Ok(Json(CartResponse::new(Some("Cart cleared"), cart)))
}

pub async fn sync_cart(
    State(state): State<ApiState>,
    Json(payload): Json<CartSyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .cart
        .sync(&payload.user_id, payload.items)
        .await
        .map_err(cart_to_api)?;

    let response = CartResponse::new(None, outcome.cart);
    Ok(Json(CartSyncResponse {
        success: true,
        message: "Cart synced",
        cart: response.cart,
        summary: response.summary,
        skipped_items: outcome.skipped,
    }))
}

pub async fn cart_summary(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.cart.summary(&user_id).await.map_err(cart_to_api)?;
    Ok(Json(CartSummaryResponse {
        success: true,
        summary,
    }))
}
