//! Blog post handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::blog::{CreateBlogCommand, UpdateBlogCommand};
use crate::application::repos::BlogListParams;

use super::blog_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

pub async fn list_blogs(
    State(state): State<ApiState>,
    Query(query): Query<BlogListQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let params = BlogListParams::from(query);
    let page = state.blogs.list(&params).await.map_err(blog_to_api)?;

    Ok(Json(BlogListResponse {
        success: true,
        page: page.value,
        cached: page.cached,
    }))
}

pub async fn get_blog(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let blog = state.blogs.detail(id).await.map_err(blog_to_api)?;

    Ok(Json(BlogDetailResponse {
        success: true,
        blog: blog.value,
        cached: blog.cached,
    }))
}

pub async fn create_blog(
    State(state): State<ApiState>,
    Json(payload): Json<BlogCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author = payload.author.unwrap_or_default();
    let author_name = payload
        .author_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(author.name);

    let command = CreateBlogCommand {
        title: payload.title,
        slug: payload.slug,
        short_description: payload.short_description,
        content: payload.content,
        image: payload.image,
        author_name,
        author_profile_image: payload.author_profile_image.or(author.profile_image),
        author_bio: payload.bio.or(author.bio),
        category: payload.category,
        tags: payload.tags.map(TagsInput::into_vec).unwrap_or_default(),
        featured: payload.featured,
        trending: payload.trending,
        status: payload.status,
        read_time: payload.read_time,
        meta_title: payload.meta_title,
        meta_description: payload.meta_description,
        meta_keywords: payload.meta_keywords.map(TagsInput::into_vec),
    };

    let blog = state.blogs.create(command).await.map_err(blog_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(BlogMutationResponse {
            success: true,
            message: "Blog post created successfully",
            blog,
        }),
    ))
}

pub async fn update_blog(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BlogUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = UpdateBlogCommand {
        title: payload.title,
        short_description: payload.short_description,
        content: payload.content,
        image: payload.image,
        category: payload.category,
        tags: payload.tags.map(TagsInput::into_vec),
        featured: payload.featured,
        trending: payload.trending,
        status: payload.status,
        read_time: payload.read_time,
        meta_title: payload.meta_title,
        meta_description: payload.meta_description,
        meta_keywords: payload.meta_keywords.map(TagsInput::into_vec),
    };

    let blog = state
        .blogs
        .update(id, command)
        .await
        .map_err(blog_to_api)?;

    Ok(Json(BlogMutationResponse {
        success: true,
        message: "Blog post updated successfully",
        blog,
    }))
}

pub async fn delete_blog(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.blogs.delete(id).await.map_err(blog_to_api)?;

    Ok(Json(BlogDeletedResponse {
        success: true,
        message: "Blog post deleted successfully",
        title: deleted.title,
    }))
}

pub async fn comment_blog(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comments_count = state
        .blogs
        .comment(id, payload.user, &payload.text)
        .await
        .map_err(blog_to_api)?;

    Ok(Json(CommentResponse {
        success: true,
        message: "Comment added successfully",
        comments_count,
    }))
}

pub async fn like_blog(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LikeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .blogs
        .toggle_like(id, payload.user_id)
        .await
        .map_err(blog_to_api)?;

    Ok(Json(LikeResponse {
        success: true,
        outcome,
    }))
}
