//! Blog post use-cases: cached reads and cache-invalidating writes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::total_pages;
use crate::application::repos::{
    BlogListParams, BlogListQuery, BlogPostsRepo, BlogPostsWriteRepo, CreateBlogPostParams,
    LikeOutcome, RepoError, UpdateBlogPostParams,
};
use crate::cache::{CacheTrigger, Cached, ReadThroughCache, blog_detail_key, blog_list_key};
use crate::domain::content::sanitize_blog_html;
use crate::domain::entities::{BlogAuthor, BlogComment, BlogPostRecord};
use crate::domain::error::DomainError;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async};
use crate::domain::types::BlogStatus;

pub const DEFAULT_READ_TIME_MINUTES: i32 = 10;
pub const DEFAULT_AUTHOR_AVATAR: &str =
    "https://up.yimg.com/ib/th/id/OIP.fEi7a3-GaqSrnK68-Sp2YwHaHa?pid=Api&rs=1&c=1&qlt=95&w=105&h=105";
const STORE_NAME: &str = "Pink Dreams";

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("blog post not found")]
    NotFound,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("comment is empty")]
    EmptyComment,
    #[error("could not derive a slug: {0}")]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Pagination block of the blog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_blogs: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

/// One cached page of the blog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListPage {
    pub blogs: Vec<BlogPostRecord>,
    pub pagination: BlogPagination,
}

#[derive(Debug, Clone, Default)]
pub struct CreateBlogCommand {
    pub title: String,
    pub slug: Option<String>,
    pub short_description: String,
    pub content: String,
    pub image: String,
    pub author_name: String,
    pub author_profile_image: Option<String>,
    pub author_bio: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub status: Option<BlogStatus>,
    pub read_time: Option<i32>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<Vec<String>>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBlogCommand {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub status: Option<BlogStatus>,
    pub read_time: Option<i32>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct DeletedBlog {
    pub id: Uuid,
    pub title: String,
}

#[derive(Clone)]
pub struct BlogService {
    reader: Arc<dyn BlogPostsRepo>,
    writer: Arc<dyn BlogPostsWriteRepo>,
    cache: ReadThroughCache,
    trigger: CacheTrigger,
}

impl BlogService {
    pub fn new(
        reader: Arc<dyn BlogPostsRepo>,
        writer: Arc<dyn BlogPostsWriteRepo>,
        cache: ReadThroughCache,
        trigger: CacheTrigger,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            trigger,
        }
    }

    pub async fn list(&self, params: &BlogListParams) -> Result<Cached<BlogListPage>, BlogError> {
        let query = BlogListQuery::normalize(params)?;
        let key = blog_list_key(&query);

        self.cache
            .get_or_compute(&key, self.cache.list_ttl(), || async {
                let page = self.reader.list_posts(&query).await?;
                let total_pages = total_pages(page.total, query.limit);
                Ok::<_, BlogError>(BlogListPage {
                    blogs: page.items,
                    pagination: BlogPagination {
                        current_page: query.page,
                        total_pages,
                        total_blogs: page.total,
                        has_next_page: u64::from(query.page) < total_pages,
                        has_prev_page: query.page > 1,
                        limit: query.limit,
                    },
                })
            })
            .await
    }

    /// Fetch one post. A cache miss counts as a view; a hit does not.
    pub async fn detail(&self, id: Uuid) -> Result<Cached<BlogPostRecord>, BlogError> {
        let key = blog_detail_key(id);
        self.cache
            .get_or_compute(&key, self.cache.detail_ttl(), || async {
                self.reader
                    .increment_views(id)
                    .await?
                    .ok_or(BlogError::NotFound)
            })
            .await
    }

    pub async fn create(&self, command: CreateBlogCommand) -> Result<BlogPostRecord, BlogError> {
        let title = required(&command.title, "title")?;
        let short_description = required(&command.short_description, "shortDescription")?;
        let content = required(&command.content, "content")?;
        let image = required(&command.image, "image")?;
        let author_name = required(&command.author_name, "authorName")?;
        let category = required(&command.category, "category")?;

        let slug_source = command
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&title)
            .to_string();
        let slug = self.unique_slug(&slug_source, None).await?;

        let tags = clean_tags(command.tags);
        let meta_keywords = command.meta_keywords.unwrap_or_else(|| tags.clone());
        let meta_title = non_blank(command.meta_title)
            .unwrap_or_else(|| format!("{title} - {category} | {STORE_NAME}"));
        let meta_description =
            non_blank(command.meta_description).unwrap_or_else(|| short_description.clone());

        let params = CreateBlogPostParams {
            slug,
            short_description,
            content: sanitize_blog_html(&content),
            image,
            author: BlogAuthor {
                name: author_name,
                profile_image: Some(
                    non_blank(command.author_profile_image)
                        .unwrap_or_else(|| DEFAULT_AUTHOR_AVATAR.to_string()),
                ),
                bio: non_blank(command.author_bio),
            },
            category,
            tags,
            featured: command.featured.unwrap_or(false),
            trending: command.trending.unwrap_or(false),
            status: command.status.unwrap_or(BlogStatus::Draft),
            published_at: Some(OffsetDateTime::now_utc()),
            read_time: command.read_time.unwrap_or(DEFAULT_READ_TIME_MINUTES),
            meta_title: Some(meta_title),
            meta_description: Some(meta_description),
            meta_keywords,
            title,
        };

        let post = self.writer.create_post(params).await?;
        info!(
            target = "pinkdreams::blog",
            blog_id = %post.id,
            slug = %post.slug,
            "Blog post created"
        );
        self.trigger.blog_changed(post.id).await;
        Ok(post)
    }

    pub async fn update(
        &self,
        id: Uuid,
        command: UpdateBlogCommand,
    ) -> Result<BlogPostRecord, BlogError> {
        let existing = self
            .reader
            .find_by_id(id)
            .await?
            .ok_or(BlogError::NotFound)?;

        let mut slug = existing.slug.clone();
        let title = match command.title {
            Some(title) => {
                let title = required(&title, "title")?;
                if title != existing.title {
                    slug = self.unique_slug(&title, Some(id)).await?;
                }
                title
            }
            None => existing.title.clone(),
        };

        let params = UpdateBlogPostParams {
            id,
            title,
            slug,
            short_description: command
                .short_description
                .unwrap_or(existing.short_description),
            content: command
                .content
                .map(|content| sanitize_blog_html(&content))
                .unwrap_or(existing.content),
            image: command.image.unwrap_or(existing.image),
            author: existing.author,
            category: command.category.unwrap_or(existing.category),
            tags: command.tags.map(clean_tags).unwrap_or(existing.tags),
            featured: command.featured.unwrap_or(existing.featured),
            trending: command.trending.unwrap_or(existing.trending),
            status: command.status.unwrap_or(existing.status),
            published_at: existing.published_at,
            read_time: command.read_time.unwrap_or(existing.read_time),
            meta_title: command.meta_title.or(existing.meta_title),
            meta_description: command.meta_description.or(existing.meta_description),
            meta_keywords: command.meta_keywords.unwrap_or(existing.meta_keywords),
        };

        let post = self
            .writer
            .update_post(params)
            .await?
            .ok_or(BlogError::NotFound)?;
        info!(target = "pinkdreams::blog", blog_id = %post.id, "Blog post updated");
        self.trigger.blog_changed(post.id).await;
        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeletedBlog, BlogError> {
        let post = self
            .writer
            .delete_post(id)
            .await?
            .ok_or(BlogError::NotFound)?;
        info!(target = "pinkdreams::blog", blog_id = %post.id, "Blog post deleted");
        self.trigger.blog_changed(post.id).await;
        Ok(DeletedBlog {
            id: post.id,
            title: post.title,
        })
    }

    /// Append a comment and return the new comment count.
    pub async fn comment(&self, id: Uuid, user: JsonValue, text: &str) -> Result<u64, BlogError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BlogError::EmptyComment);
        }

        let comment = BlogComment {
            id: Uuid::new_v4(),
            user,
            text: text.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        let count = self
            .writer
            .add_comment(id, comment)
            .await?
            .ok_or(BlogError::NotFound)?;
        self.trigger.blog_changed(id).await;
        Ok(count)
    }

    pub async fn toggle_like(&self, id: Uuid, user_id: i64) -> Result<LikeOutcome, BlogError> {
        let outcome = self
            .writer
            .toggle_like(id, user_id)
            .await?
            .ok_or(BlogError::NotFound)?;
        self.trigger.blog_changed(id).await;
        Ok(outcome)
    }

    async fn unique_slug(&self, source: &str, exclude: Option<Uuid>) -> Result<String, BlogError> {
        let reader = self.reader.clone();
        match generate_unique_slug_async(source, move |candidate| {
            let reader = reader.clone();
            async move {
                reader
                    .slug_exists(&candidate, exclude)
                    .await
                    .map(|taken| !taken)
            }
        })
        .await
        {
            Ok(slug) => Ok(slug),
            Err(SlugAsyncError::Slug(err)) => Err(BlogError::Slug(err)),
            Err(SlugAsyncError::Predicate(err)) => Err(BlogError::Repo(err)),
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, BlogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BlogError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_lowercased_and_deduplicated() {
        let tags = clean_tags(vec![
            " Summer ".into(),
            "summer".into(),
            "".into(),
            "Linen".into(),
        ]);
        assert_eq!(tags, vec!["summer".to_string(), "linen".to_string()]);
    }

    #[test]
    fn required_fields_reject_blank_input() {
        assert!(matches!(
            required("   ", "title"),
            Err(BlogError::MissingField("title"))
        ));
        assert_eq!(required(" Hello ", "title").expect("value"), "Hello");
    }
}
