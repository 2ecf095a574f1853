use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{
    BlogStatus, CategoryKind, ContactStatus, InquiryType, SubscriberStatus, SubscriptionSource,
};

/// A blog post as served by the listing and detail endpoints.
///
/// Records round-trip through the cache store as JSON, so every field must
/// deserialize back from what it serializes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostRecord {
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
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub read_time: i32,
    pub likes: BlogLikes,
    pub views: i64,
    pub comments: Vec<BlogComment>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogAuthor {
    pub name: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogLikes {
    pub count: i64,
    pub users: Vec<i64>,
}

impl BlogLikes {
    /// Flip `user_id`'s like. Returns whether the user now likes the post.
    pub fn toggle(&mut self, user_id: i64) -> bool {
        if let Some(position) = self.users.iter().position(|id| *id == user_id) {
            self.users.remove(position);
            self.count = (self.count - 1).max(0);
            false
        } else {
            self.users.push(user_id);
            self.count += 1;
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogComment {
    pub id: Uuid,
    pub user: JsonValue,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub id: Uuid,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterPreferences {
    pub promotions: bool,
    pub new_products: bool,
    pub style_guides: bool,
}

impl Default for NewsletterPreferences {
    fn default() -> Self {
        Self {
            promotions: true,
            new_products: true,
            style_guides: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub status: SubscriberStatus,
    pub subscription_source: SubscriptionSource,
    pub preferences: NewsletterPreferences,
    pub ip_address: String,
    pub user_agent: String,
    #[serde(with = "time::serde::rfc3339")]
    pub subscribed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_email_sent: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub unsubscribed_at: Option<OffsetDateTime>,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub inquiry_type: InquiryType,
    pub status: ContactStatus,
    pub ip_address: String,
    pub user_agent: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub replied_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub user_id: String,
    pub items: Vec<CartItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CartRecord {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    pub fn total_price(&self) -> f64 {
        let total: f64 = self
            .items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum();
        (total * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub added_at: OffsetDateTime,
    pub product_snapshot: Option<ProductSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRecord {
    pub user_id: String,
    pub items: Vec<WishlistItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl WishlistRecord {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_like_twice_restores_the_count() {
        let mut likes = BlogLikes::default();
        assert!(likes.toggle(7));
        assert_eq!(likes.count, 1);
        assert!(!likes.toggle(7));
        assert_eq!(likes.count, 0);
        assert!(likes.users.is_empty());
    }

    #[test]
    fn unlike_never_drives_count_negative() {
        let mut likes = BlogLikes {
            count: 0,
            users: vec![3],
        };
        assert!(!likes.toggle(3));
        assert_eq!(likes.count, 0);
    }

    #[test]
    fn cart_totals_round_to_cents() {
        let now = OffsetDateTime::now_utc();
        let cart = CartRecord {
            user_id: "u1".to_string(),
            items: vec![
                CartItem {
                    product_id: 1,
                    quantity: 3,
                    price: 0.1,
                    added_at: now,
                },
                CartItem {
                    product_id: 2,
                    quantity: 1,
                    price: 19.99,
                    added_at: now,
                },
            ],
            updated_at: now,
        };
        assert_eq!(cart.total_items(), 4);
        assert_eq!(cart.total_price(), 20.29);
    }
}
