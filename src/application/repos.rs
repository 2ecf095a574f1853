//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::domain::entities::{
    BlogAuthor, BlogComment, BlogPostRecord, CartRecord, CategoryRecord, ContactRecord,
    NewsletterPreferences, SubscriberRecord, WishlistRecord,
};
use crate::domain::error::DomainError;
use crate::domain::types::{
    BlogStatus, CategoryKind, ContactStatus, InquiryType, SubscriberStatus, SubscriptionSource,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub const DEFAULT_BLOG_PAGE: u32 = 1;
pub const DEFAULT_BLOG_LIMIT: u32 = 10;
pub const CATEGORY_ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlogSortBy {
    #[default]
    Latest,
    Name,
    MostViewed,
    MostLiked,
}

impl BlogSortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            BlogSortBy::Latest => "latest",
            BlogSortBy::Name => "name",
            BlogSortBy::MostViewed => "most_viewed",
            BlogSortBy::MostLiked => "most_liked",
        }
    }

    /// Unknown values sort by recency, matching the storefront's fallback.
    fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("name") => BlogSortBy::Name,
            Some("most_viewed") => BlogSortBy::MostViewed,
            Some("most_liked") => BlogSortBy::MostLiked,
            _ => BlogSortBy::Latest,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Raw `GET /all-blogs` query string, exactly as the client sent it.
#[derive(Debug, Clone, Default)]
pub struct BlogListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub status: Option<String>,
}

/// Canonical blog listing query.
///
/// Every recognized filter is an explicit field with a concrete default, so
/// two requests meaning the same thing compare equal and key identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlogListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub category: String,
    pub tag: String,
    pub sort_by: BlogSortBy,
    pub sort_order: SortOrder,
    pub status: Option<BlogStatus>,
}

impl Default for BlogListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_BLOG_PAGE,
            limit: DEFAULT_BLOG_LIMIT,
            search: String::new(),
            category: CATEGORY_ALL.to_string(),
            tag: String::new(),
            sort_by: BlogSortBy::Latest,
            sort_order: SortOrder::Desc,
            status: None,
        }
    }
}

impl BlogListQuery {
    /// Canonicalize raw parameters. Only an unrecognized status is an error.
    pub fn normalize(params: &BlogListParams) -> Result<Self, DomainError> {
        let page = PageRequest::from_query(
            params.page.as_deref(),
            params.limit.as_deref(),
            DEFAULT_BLOG_LIMIT,
        );

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => CATEGORY_ALL.to_string(),
            Some(value) if value.eq_ignore_ascii_case(CATEGORY_ALL) => CATEGORY_ALL.to_string(),
            Some(value) => value.to_string(),
        };

        let tag = params
            .tag
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| value != CATEGORY_ALL)
            .unwrap_or_default();

        let sort_by = BlogSortBy::parse_lenient(params.sort_by.as_deref());
        let sort_order = match sort_by {
            BlogSortBy::MostViewed | BlogSortBy::MostLiked => SortOrder::Desc,
            BlogSortBy::Latest | BlogSortBy::Name => {
                match params.sort_order.as_deref().map(str::trim) {
                    Some(value) if value.eq_ignore_ascii_case("asc") => SortOrder::Asc,
                    _ => SortOrder::Desc,
                }
            }
        };

        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) if value.eq_ignore_ascii_case("all") => None,
            Some(value) => Some(value.parse::<BlogStatus>()?),
        };

        Ok(Self {
            page: page.page,
            limit: page.limit,
            search,
            category,
            tag,
            sort_by,
            sort_order,
            status,
        })
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn search_filter(&self) -> Option<&str> {
        Some(self.search.as_str()).filter(|value| !value.is_empty())
    }

    pub fn category_filter(&self) -> Option<&str> {
        Some(self.category.as_str()).filter(|value| *value != CATEGORY_ALL)
    }

    pub fn tag_filter(&self) -> Option<&str> {
        Some(self.tag.as_str()).filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct CreateBlogPostParams {
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub content: String,
    pub image: String,
    pub author: BlogAuthor,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub trending: bool,
    pub status: BlogStatus,
    pub published_at: Option<OffsetDateTime>,
    pub read_time: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateBlogPostParams {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub content: String,
    pub image: String,
    pub author: BlogAuthor,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub trending: bool,
    pub status: BlogStatus,
    pub published_at: Option<OffsetDateTime>,
    pub read_time: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub liked: bool,
    pub total_likes: i64,
}

#[async_trait]
pub trait BlogPostsRepo: Send + Sync {
    async fn list_posts(
        &self,
        query: &BlogListQuery,
    ) -> Result<OffsetPage<BlogPostRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;

    /// Bump the view counter and return the updated row.
    async fn increment_views(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait BlogPostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreateBlogPostParams)
    -> Result<BlogPostRecord, RepoError>;

    async fn update_post(
        &self,
        params: UpdateBlogPostParams,
    ) -> Result<Option<BlogPostRecord>, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;

    /// Append a comment. Returns the new comment count, or `None` for an
    /// unknown post.
    async fn add_comment(&self, id: Uuid, comment: BlogComment)
    -> Result<Option<u64>, RepoError>;

    async fn toggle_like(&self, id: Uuid, user_id: i64)
    -> Result<Option<LikeOutcome>, RepoError>;
}

#[derive(Debug, Clone, Default)]
pub struct CategoryQueryFilter {
    pub active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub kind: CategoryKind,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub icon: String,
    pub is_active: bool,
    pub parent_category: Option<Uuid>,
    pub meta_title: String,
    pub meta_description: String,
    pub order: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateCategoryParams {
    pub kind: CategoryKind,
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
    pub icon: String,
    pub is_active: bool,
    pub parent_category: Option<Uuid>,
    pub meta_title: String,
    pub meta_description: String,
    pub order: i32,
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(
        &self,
        kind: CategoryKind,
        filter: &CategoryQueryFilter,
    ) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_by_id(
        &self,
        kind: CategoryKind,
        id: Uuid,
    ) -> Result<Option<CategoryRecord>, RepoError>;

    /// Any category of `kind` whose name (case-insensitive) or slug collides,
    /// ignoring `exclude`.
    async fn find_conflict(
        &self,
        kind: CategoryKind,
        name: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<CategoryRecord>, RepoError>;

    async fn max_order(&self, kind: CategoryKind) -> Result<Option<i32>, RepoError>;

    async fn count_categories(
        &self,
        kind: CategoryKind,
        active: Option<bool>,
    ) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait CategoriesWriteRepo: Send + Sync {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<Option<CategoryRecord>, RepoError>;

    async fn delete_category(&self, kind: CategoryKind, id: Uuid) -> Result<bool, RepoError>;

    /// Set each listed category's order to its position in `ids`.
    async fn reorder_categories(&self, kind: CategoryKind, ids: &[Uuid])
    -> Result<(), RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateSubscriberParams {
    pub email: String,
    pub name: String,
    pub subscription_source: SubscriptionSource,
    pub preferences: NewsletterPreferences,
    pub ip_address: String,
    pub user_agent: String,
    pub verification_token: String,
    pub subscribed_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u8,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

#[async_trait]
pub trait NewsletterRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<SubscriberRecord>, RepoError>;

    async fn create_subscriber(
        &self,
        params: CreateSubscriberParams,
    ) -> Result<SubscriberRecord, RepoError>;

    /// Persist the mutable columns of an existing subscriber.
    async fn save_subscriber(
        &self,
        record: &SubscriberRecord,
    ) -> Result<SubscriberRecord, RepoError>;

    async fn count_subscribers(&self, status: Option<SubscriberStatus>) -> Result<u64, RepoError>;

    /// Active subscriptions grouped by calendar month since `since`.
    async fn monthly_growth(&self, since: OffsetDateTime) -> Result<Vec<MonthlyCount>, RepoError>;

    async fn source_counts(&self) -> Result<Vec<LabelCount>, RepoError>;

    async fn list_subscribers(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<OffsetPage<SubscriberRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct CreateContactParams {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub inquiry_type: InquiryType,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactQueryFilter {
    pub status: Option<ContactStatus>,
    pub inquiry_type: Option<InquiryType>,
}

#[async_trait]
pub trait ContactsRepo: Send + Sync {
    async fn create_submission(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactRecord, RepoError>;

    async fn list_submissions(
        &self,
        filter: &ContactQueryFilter,
        page: PageRequest,
    ) -> Result<OffsetPage<ContactRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactRecord>, RepoError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        replied_at: Option<OffsetDateTime>,
    ) -> Result<Option<ContactRecord>, RepoError>;

    async fn delete_submission(&self, id: Uuid) -> Result<bool, RepoError>;

    async fn count_submissions(&self) -> Result<u64, RepoError>;

    async fn status_counts(&self) -> Result<Vec<LabelCount>, RepoError>;

    async fn inquiry_type_counts(&self) -> Result<Vec<LabelCount>, RepoError>;
}

#[async_trait]
pub trait CartsRepo: Send + Sync {
    async fn load_cart(&self, user_id: &str) -> Result<Option<CartRecord>, RepoError>;

    /// Replace the stored cart with `cart`, items included.
    async fn save_cart(&self, cart: &CartRecord) -> Result<(), RepoError>;
}

#[async_trait]
pub trait WishlistsRepo: Send + Sync {
    async fn load_wishlist(&self, user_id: &str) -> Result<Option<WishlistRecord>, RepoError>;

    async fn save_wishlist(&self, wishlist: &WishlistRecord) -> Result<(), RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}

/// Decode a JSONB column into `T`, reporting shape drift as an integrity error.
pub fn decode_json_column<T>(column: &'static str, value: JsonValue) -> Result<T, RepoError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(value).map_err(|err| RepoError::Integrity {
        message: format!("column `{column}` holds unexpected json: {err}"),
    })
}
