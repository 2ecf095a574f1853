use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::application::blog::BlogListPage;
use crate::application::cart::{CartLineInput, CartSummary};
use crate::application::categories::CategoryStats;
use crate::application::contact::{ContactStats, SubmissionPage};
use crate::application::newsletter::{NewsletterStats, PreferencesPatch, SubscriberPage};
use crate::application::repos::{BlogListParams, LikeOutcome};
use crate::application::wishlist::WishlistItemInput;
use crate::domain::entities::{
    BlogPostRecord, CartRecord, CategoryRecord, ContactRecord, NewsletterPreferences,
    ProductSnapshot, SubscriberRecord, WishlistRecord,
};
use crate::domain::types::BlogStatus;

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Tags arrive either as an array or as a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Csv(raw) => raw.split(',').map(str::to_string).collect(),
        }
    }
}

// ----- Blogs -----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQueryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub status: Option<String>,
}

impl From<BlogListQueryParams> for BlogListParams {
    fn from(query: BlogListQueryParams) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            search: query.search,
            category: query.category,
            tag: query.tag,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            status: query.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    #[serde(default)]
    pub name: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogCreateRequest {
    pub title: String,
    pub slug: Option<String>,
    pub short_description: String,
    pub content: String,
    pub image: String,
    pub author: Option<AuthorInput>,
    pub author_name: Option<String>,
    pub author_profile_image: Option<String>,
    pub bio: Option<String>,
    pub category: String,
    pub tags: Option<TagsInput>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub status: Option<BlogStatus>,
    pub read_time: Option<i32>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<TagsInput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogUpdateRequest {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub tags: Option<TagsInput>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub status: Option<BlogStatus>,
    pub read_time: Option<i32>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<TagsInput>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub user: JsonValue,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BlogListResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: BlogListPage,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct BlogDetailResponse {
    pub success: bool,
    pub blog: BlogPostRecord,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct BlogMutationResponse {
    pub success: bool,
    pub message: &'static str,
    pub blog: BlogPostRecord,
}

#[derive(Debug, Serialize)]
pub struct BlogDeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub success: bool,
    pub message: &'static str,
    pub comments_count: u64,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: LikeOutcome,
}

// ----- Categories -----

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    pub active: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    pub parent_category: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "double_option")]
    pub parent_category: Option<Option<Uuid>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReorderRequest {
    pub category_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub success: bool,
    pub categories: Vec<CategoryRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub category: CategoryRecord,
}

#[derive(Debug, Serialize)]
pub struct CategoryStatsResponse {
    pub success: bool,
    pub stats: CategoryStats,
}

// ----- Newsletter -----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PreferencesRequest {
    pub email: String,
    pub preferences: Option<PreferencesPatch>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriberListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: &'static str,
    pub already_subscribed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<SubscriberRecord>,
}

#[derive(Debug, Serialize)]
pub struct NewsletterStatsResponse {
    pub success: bool,
    pub stats: NewsletterStats,
}

#[derive(Debug, Serialize)]
pub struct SubscribersResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: SubscriberPage,
}

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub success: bool,
    pub message: &'static str,
    pub preferences: NewsletterPreferences,
}

// ----- Contact -----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmitRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub inquiry_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub inquiry_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub submission_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SubmissionsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub page: SubmissionPage,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub submission: ContactRecord,
}

#[derive(Debug, Serialize)]
pub struct ContactStatsResponse {
    pub success: bool,
    pub stats: ContactStats,
}

// ----- Cart -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddRequest {
    pub user_id: String,
    pub product_id: i64,
    pub quantity: Option<i32>,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdateRequest {
    pub user_id: String,
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub user_id: String,
    pub product_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSyncRequest {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartLineInput>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub cart: CartRecord,
    #[serde(flatten)]
    pub summary: CartSummary,
}

impl CartResponse {
    pub fn new(message: Option<&'static str>, cart: CartRecord) -> Self {
        Self {
            success: true,
            message,
            summary: CartSummary::from(&cart),
            cart,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSyncResponse {
    pub success: bool,
    pub message: &'static str,
    pub cart: CartRecord,
    #[serde(flatten)]
    pub summary: CartSummary,
    pub skipped_items: usize,
}

#[derive(Debug, Serialize)]
pub struct CartSummaryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: CartSummary,
}

// ----- Wishlist -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistAddRequest {
    pub user_id: String,
    pub product_id: i64,
    #[serde(default)]
    pub product_snapshot: Option<ProductSnapshot>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSyncRequest {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<WishlistItemInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCartRequest {
    pub user_id: String,
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub wishlist: WishlistRecord,
    pub item_count: usize,
}

impl WishlistResponse {
    pub fn new(message: Option<&'static str>, wishlist: WishlistRecord) -> Self {
        Self {
            success: true,
            message,
            item_count: wishlist.items.len(),
            wishlist,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistCheckResponse {
    pub success: bool,
    pub in_wishlist: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSummaryResponse {
    pub success: bool,
    pub item_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCartResponse {
    pub success: bool,
    pub message: &'static str,
    pub moved: Vec<i64>,
    pub skipped: Vec<i64>,
    pub wishlist: WishlistRecord,
    pub cart: CartRecord,
    pub cart_summary: CartSummary,
}

// ----- Shared -----

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_update_distinguishes_null_from_absent() {
        let absent: CategoryUpdateRequest = serde_json::from_str("{}").expect("json");
        assert_eq!(absent.parent_category, None);

        let cleared: CategoryUpdateRequest =
            serde_json::from_str(r#"{"parentCategory":null}"#).expect("json");
        assert_eq!(cleared.parent_category, Some(None));
    }

    #[test]
    fn tags_accept_arrays_and_csv() {
        let list: TagsInput = serde_json::from_str(r#"["a","b"]"#).expect("json");
        let csv: TagsInput = serde_json::from_str(r#""a, b""#).expect("json");
        assert_eq!(list.into_vec(), vec!["a", "b"]);
        assert_eq!(csv.into_vec(), vec!["a", " b"]);
    }
}
