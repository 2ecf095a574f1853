//! Category handlers, shared by the product and blog category routes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::categories::{
    CategoryService, CreateCategoryCommand, UpdateCategoryCommand,
};
use crate::application::repos::CategoryQueryFilter;
use crate::domain::types::CategoryKind;

use super::category_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

fn service(state: &ApiState, kind: CategoryKind) -> &CategoryService {
    match kind {
        CategoryKind::Product => state.product_categories.as_ref(),
        CategoryKind::Blog => state.blog_categories.as_ref(),
    }
}

/// Anything other than `true`/`false` means no filter.
fn parse_active(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("true") => Some(true),
        Some(value) if value.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

async fn list(
    state: &ApiState,
    kind: CategoryKind,
    query: CategoryListQuery,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let filter = CategoryQueryFilter {
        active: parse_active(query.active.as_deref()),
        search: query.search.map(|s| s.trim().to_string()),
    };
    let categories = service(state, kind)
        .list(&filter)
        .await
        .map_err(category_to_api)?;

    Ok(Json(CategoryListResponse {
        success: true,
        count: categories.len(),
        categories,
    }))
}

async fn get(
    state: &ApiState,
    kind: CategoryKind,
    id: Uuid,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = service(state, kind)
        .get(id)
        .await
        .map_err(category_to_api)?;
    Ok(Json(CategoryResponse {
        success: true,
        message: None,
        category,
    }))
}

async fn create(
    state: &ApiState,
    kind: CategoryKind,
    payload: CategoryCreateRequest,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let command = CreateCategoryCommand {
        name: payload.name,
        description: payload.description,
        image: payload.image,
        icon: payload.icon,
        is_active: payload.is_active,
        parent_category: payload.parent_category,
        meta_title: payload.meta_title,
        meta_description: payload.meta_description,
    };
    let category = service(state, kind)
        .create(command)
        .await
        .map_err(category_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            success: true,
            message: Some(format!("{} created successfully", kind.label())),
            category,
        }),
    ))
}

async fn update(
    state: &ApiState,
    kind: CategoryKind,
    id: Uuid,
    payload: CategoryUpdateRequest,
) -> Result<Json<CategoryResponse>, ApiError> {
    let command = UpdateCategoryCommand {
        name: payload.name,
        description: payload.description,
        image: payload.image,
        icon: payload.icon,
        is_active: payload.is_active,
        parent_category: payload.parent_category,
        meta_title: payload.meta_title,
        meta_description: payload.meta_description,
        order: payload.order,
    };
    let category = service(state, kind)
        .update(id, command)
        .await
        .map_err(category_to_api)?;

    Ok(Json(CategoryResponse {
        success: true,
        message: Some(format!("{} updated successfully", kind.label())),
        category,
    }))
}

async fn toggle_active(
    state: &ApiState,
    kind: CategoryKind,
    id: Uuid,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = service(state, kind)
        .toggle_active(id)
        .await
        .map_err(category_to_api)?;
    let verb = if category.is_active {
        "activated"
    } else {
        "deactivated"
    };

    Ok(Json(CategoryResponse {
        success: true,
        message: Some(format!("{} {verb} successfully", kind.label())),
        category,
    }))
}

async fn delete(
    state: &ApiState,
    kind: CategoryKind,
    id: Uuid,
) -> Result<Json<MessageResponse>, ApiError> {
    service(state, kind)
        .delete(id)
        .await
        .map_err(category_to_api)?;
    Ok(Json(MessageResponse::new(format!(
        "{} deleted successfully",
        kind.label()
    ))))
}

async fn reorder(
    state: &ApiState,
    kind: CategoryKind,
    payload: ReorderRequest,
) -> Result<Json<MessageResponse>, ApiError> {
    service(state, kind)
        .reorder(payload.category_ids)
        .await
        .map_err(category_to_api)?;
    Ok(Json(MessageResponse::new("Categories reordered successfully")))
}

async fn stats(
    state: &ApiState,
    kind: CategoryKind,
) -> Result<Json<CategoryStatsResponse>, ApiError> {
    let stats = service(state, kind)
        .stats()
        .await
        .map_err(category_to_api)?;
    Ok(Json(CategoryStatsResponse {
        success: true,
        stats,
    }))
}

// ----- Product categories -----

pub async fn list_product_categories(
    State(state): State<ApiState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(&state, CategoryKind::Product, query).await
}

pub async fn get_product_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    get(&state, CategoryKind::Product, id).await
}

pub async fn create_product_category(
    State(state): State<ApiState>,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    create(&state, CategoryKind::Product, payload).await
}

pub async fn update_product_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    update(&state, CategoryKind::Product, id, payload).await
}

pub async fn toggle_product_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    toggle_active(&state, CategoryKind::Product, id).await
}

pub async fn delete_product_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    delete(&state, CategoryKind::Product, id).await
}

pub async fn reorder_product_categories(
    State(state): State<ApiState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    reorder(&state, CategoryKind::Product, payload).await
}

pub async fn product_category_stats(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    stats(&state, CategoryKind::Product).await
}

// ----- Blog categories -----

pub async fn list_blog_categories(
    State(state): State<ApiState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    list(&state, CategoryKind::Blog, query).await
}

pub async fn get_blog_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    get(&state, CategoryKind::Blog, id).await
}

pub async fn create_blog_category(
    State(state): State<ApiState>,
    Json(payload): Json<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    create(&state, CategoryKind::Blog, payload).await
}

pub async fn update_blog_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    update(&state, CategoryKind::Blog, id, payload).await
}

pub async fn toggle_blog_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    toggle_active(&state, CategoryKind::Blog, id).await
}

pub async fn delete_blog_category(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    delete(&state, CategoryKind::Blog, id).await
}

pub async fn reorder_blog_categories(
    State(state): State<ApiState>,
    Json(payload): Json<ReorderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    reorder(&state, CategoryKind::Blog, payload).await
}

pub async fn blog_category_stats(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, ApiError> {
    stats(&state, CategoryKind::Blog).await
}

#[cfg(test)]
mod tests {
    use super::parse_active;

    #[test]
    fn active_filter_accepts_only_booleans() {
        assert_eq!(parse_active(Some("true")), Some(true));
        assert_eq!(parse_active(Some(" FALSE ")), Some(false));
        assert_eq!(parse_active(Some("all")), None);
        assert_eq!(parse_active(None), None);
    }
}
