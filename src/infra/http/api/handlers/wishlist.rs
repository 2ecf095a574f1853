//! Wishlist handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use crate::application::cart::CartSummary;

use super::wishlist_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn get_wishlist(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let wishlist = state
        .wishlist
        .get(&user_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistResponse::new(None, wishlist)))
}

pub async fn add_to_wishlist(
    State(state): State<ApiState>,
    Json(payload): Json<WishlistAddRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wishlist = state
        .wishlist
        .add(
            &payload.user_id,
            payload.product_id,
            payload.product_snapshot,
        )
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistResponse::new(
        Some("Item added to wishlist"),
        wishlist,
    )))
}

pub async fn remove_from_wishlist(
    State(state): State<ApiState>,
    Json(payload): Json<ProductRef>,
) -> Result<impl IntoResponse, ApiError> {
    let wishlist = state
        .wishlist
        .remove(&payload.user_id, payload.product_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistResponse::new(
        Some("Item removed from wishlist"),
        wishlist,
    )))
}

pub async fn clear_wishlist(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let wishlist = state
        .wishlist
        .clear(&user_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistResponse::new(Some("Wishlist cleared"), wishlist)))
}

pub async fn check_wishlist(
    State(state): State<ApiState>,
    Path((user_id, product_id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let in_wishlist = state
        .wishlist
        .contains(&user_id, product_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistCheckResponse {
        success: true,
        in_wishlist,
    }))
}

pub async fn wishlist_summary(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .wishlist
        .summary(&user_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistSummaryResponse {
        success: true,
        item_count: summary.item_count,
    }))
}

pub async fn sync_wishlist(
    State(state): State<ApiState>,
    Json(payload): Json<WishlistSyncRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let wishlist = state
        .wishlist
        .sync(&payload.user_id, payload.items)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistResponse::new(Some("Wishlist synced"), wishlist)))
}

pub async fn move_to_cart(
    State(state): State<ApiState>,
    Json(payload): Json<MoveToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .wishlist
        .move_to_cart(&payload.user_id, &payload.product_ids)
        .await
        .map_err(wishlist_to_api)?;

    Ok(Json(MoveToCartResponse {
        success: true,
        message: "Items moved to cart",
        cart_summary: CartSummary::from(&outcome.cart),
        moved: outcome.moved,
        skipped: outcome.skipped,
        wishlist: outcome.wishlist,
        cart: outcome.cart,
    }))
}
