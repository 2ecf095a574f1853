use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::cart::{CartError, CartService};
use crate::application::repos::{RepoError, WishlistsRepo};
use crate::domain::entities::{CartRecord, ProductSnapshot, WishlistItem, WishlistRecord};

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("user id is required")]
    MissingUser,
    #[error("item already in wishlist")]
    AlreadyPresent,
    #[error("item not found in wishlist")]
    ItemNotFound,
    #[error("no product ids given")]
    NothingToMove,
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemInput {
    pub product_id: i64,
    #[serde(default)]
    pub product_snapshot: Option<ProductSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistSummary {
    pub item_count: usize,
}

#[derive(Debug, Clone)]
pub struct MoveToCartOutcome {
    pub moved: Vec<i64>,
    pub skipped: Vec<i64>,
    pub wishlist: WishlistRecord,
    pub cart: CartRecord,
}

#[derive(Clone)]
pub struct WishlistService {
    repo: Arc<dyn WishlistsRepo>,
    cart: CartService,
}

impl WishlistService {
    pub fn new(repo: Arc<dyn WishlistsRepo>, cart: CartService) -> Self {
        Self { repo, cart }
    }

    pub async fn get(&self, user_id: &str) -> Result<WishlistRecord, WishlistError> {
        self.load(user_id).await
    }

    pub async fn add(
        &self,
        user_id: &str,
        product_id: i64,
        snapshot: Option<ProductSnapshot>,
    ) -> Result<WishlistRecord, WishlistError> {
        let mut wishlist = self.load(user_id).await?;
        if wishlist.contains(product_id) {
            return Err(WishlistError::AlreadyPresent);
        }
        wishlist.items.push(WishlistItem {
            product_id,
            added_at: OffsetDateTime::now_utc(),
            product_snapshot: snapshot,
        });
        self.save(wishlist).await
    }

    pub async fn remove(
        &self,
        user_id: &str,
        product_id: i64,
    ) -> Result<WishlistRecord, WishlistError> {
        let mut wishlist = self.load(user_id).await?;
        let before = wishlist.items.len();
        wishlist.items.retain(|item| item.product_id != product_id);
        if wishlist.items.len() == before {
            return Err(WishlistError::ItemNotFound);
        }
        self.save(wishlist).await
    }

    pub async fn clear(&self, user_id: &str) -> Result<WishlistRecord, WishlistError> {
        let mut wishlist = self.load(user_id).await?;
        wishlist.items.clear();
        self.save(wishlist).await
    }

    pub async fn contains(&self, user_id: &str, product_id: i64) -> Result<bool, WishlistError> {
        Ok(self.load(user_id).await?.contains(product_id))
    }

    pub async fn summary(&self, user_id: &str) -> Result<WishlistSummary, WishlistError> {
        let wishlist = self.load(user_id).await?;
        Ok(WishlistSummary {
            item_count: wishlist.items.len(),
        })
    }

    /// Union the stored wishlist with client-held items by product id.
    pub async fn sync(
        &self,
        user_id: &str,
        items: Vec<WishlistItemInput>,
    ) -> Result<WishlistRecord, WishlistError> {
        let mut wishlist = self.load(user_id).await?;
        for item in items {
            match wishlist
                .items
                .iter_mut()
                .find(|existing| existing.product_id == item.product_id)
            {
                Some(existing) => {
                    if item.product_snapshot.is_some() {
                        existing.product_snapshot = item.product_snapshot;
                    }
                }
                None => wishlist.items.push(WishlistItem {
                    product_id: item.product_id,
                    added_at: OffsetDateTime::now_utc(),
                    product_snapshot: item.product_snapshot,
                }),
            }
        }
        self.save(wishlist).await
    }

    /// Move listed products into the cart at their snapshot price.
    ///
    /// Products that are missing from the wishlist or lack a snapshot price
    /// are reported as skipped and stay where they are.
    pub async fn move_to_cart(
        &self,
        user_id: &str,
        product_ids: &[i64],
    ) -> Result<MoveToCartOutcome, WishlistError> {
        if product_ids.is_empty() {
            return Err(WishlistError::NothingToMove);
        }

        let mut wishlist = self.load(user_id).await?;
        let mut movable: Vec<(i64, f64)> = Vec::new();
        let mut skipped: Vec<i64> = Vec::new();

        for product_id in product_ids {
            let price = wishlist
                .items
                .iter()
                .find(|item| item.product_id == *product_id)
                .and_then(|item| item.product_snapshot.as_ref())
                .and_then(|snapshot| snapshot.price)
                .filter(|price| price.is_finite() && *price >= 0.0);
            match price {
                Some(price) if !movable.iter().any(|(id, _)| id == product_id) => {
                    movable.push((*product_id, price));
                }
                Some(_) => {}
                None => skipped.push(*product_id),
            }
        }

        let cart = self.cart.add_units(&wishlist.user_id, &movable).await?;
        wishlist
            .items
            .retain(|item| !movable.iter().any(|(id, _)| *id == item.product_id));
        let wishlist = self.save(wishlist).await?;

        info!(
            target = "pinkdreams::wishlist",
            moved = movable.len(),
            skipped = skipped.len(),
            "Wishlist items moved to cart"
        );

        Ok(MoveToCartOutcome {
            moved: movable.into_iter().map(|(id, _)| id).collect(),
            skipped,
            wishlist,
            cart,
        })
    }

    async fn load(&self, user_id: &str) -> Result<WishlistRecord, WishlistError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(WishlistError::MissingUser);
        }
        Ok(self
            .repo
            .load_wishlist(user_id)
            .await?
            .unwrap_or_else(|| WishlistRecord::empty(user_id)))
    }

    async fn save(&self, mut wishlist: WishlistRecord) -> Result<WishlistRecord, WishlistError> {
        wishlist.updated_at = OffsetDateTime::now_utc();
        self.repo.save_wishlist(&wishlist).await?;
        Ok(wishlist)
    }
}
