use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::application::repos::{CartsRepo, RepoError};
use crate::domain::entities::{CartItem, CartRecord};

#[derive(Debug, Error)]
pub enum CartError {
    #[error("user id is required")]
    MissingUser,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("price must be a non-negative number")]
    InvalidPrice,
    #[error("item not found in cart")]
    ItemNotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Client-side cart line as sent by `/cart/sync`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub total_items: i64,
    pub total_price: f64,
    pub item_count: usize,
}

impl From<&CartRecord> for CartSummary {
    fn from(cart: &CartRecord) -> Self {
        Self {
            total_items: cart.total_items(),
            total_price: cart.total_price(),
            item_count: cart.items.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartSyncOutcome {
    pub cart: CartRecord,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct CartService {
    repo: Arc<dyn CartsRepo>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartsRepo>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, user_id: &str) -> Result<CartRecord, CartError> {
        self.load(user_id).await
    }

    pub async fn summary(&self, user_id: &str) -> Result<CartSummary, CartError> {
        let cart = self.load(user_id).await?;
        Ok(CartSummary::from(&cart))
    }

    /// Add `quantity` of a product, merging into an existing line.
    pub async fn add(
        &self,
        user_id: &str,
        product_id: i64,
        quantity: Option<i32>,
        price: f64,
    ) -> Result<CartRecord, CartError> {
        let quantity = quantity.unwrap_or(1);
        validate_line(quantity, price)?;

        let mut cart = self.load(user_id).await?;
        add_line(&mut cart, product_id, quantity, price);
        self.save(cart).await
    }

    /// Set a line's quantity. Zero removes the line.
    pub async fn update(
        &self,
        user_id: &str,
        product_id: i64,
        quantity: i32,
    ) -> Result<CartRecord, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut cart = self.load(user_id).await?;
        let position = find_line(&cart, product_id)?;
        if quantity == 0 {
            cart.items.remove(position);
        } else {
            cart.items[position].quantity = quantity;
        }
        self.save(cart).await
    }

    pub async fn remove(&self, user_id: &str, product_id: i64) -> Result<CartRecord, CartError> {
        let mut cart = self.load(user_id).await?;
        let position = find_line(&cart, product_id)?;
        cart.items.remove(position);
        self.save(cart).await
    }

    pub async fn clear(&self, user_id: &str) -> Result<CartRecord, CartError> {
        let mut cart = self.load(user_id).await?;
        cart.items.clear();
        self.save(cart).await
    }

    /// Merge a client-held cart into the stored one.
    ///
    /// Lines on both sides keep the larger quantity and the incoming price.
    /// Invalid incoming lines are skipped and counted.
    pub async fn sync(
        &self,
        user_id: &str,
        items: Vec<CartLineInput>,
    ) -> Result<CartSyncOutcome, CartError> {
        let mut cart = self.load(user_id).await?;
        let mut skipped = 0_usize;

        for item in items {
            if validate_line(item.quantity, item.price).is_err() {
                skipped += 1;
                continue;
            }
            match cart
                .items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                Some(line) => {
                    line.quantity = line.quantity.max(item.quantity);
                    line.price = item.price;
                }
                None => cart.items.push(CartItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    added_at: OffsetDateTime::now_utc(),
                }),
            }
        }

        let cart = self.save(cart).await?;
        Ok(CartSyncOutcome { cart, skipped })
    }

    /// Add single units of several products; used by wishlist move-to-cart.
    pub(crate) async fn add_units(
        &self,
        user_id: &str,
        products: &[(i64, f64)],
    ) -> Result<CartRecord, CartError> {
        let mut cart = self.load(user_id).await?;
        for (product_id, price) in products {
            add_line(&mut cart, *product_id, 1, *price);
        }
        self.save(cart).await
    }

    async fn load(&self, user_id: &str) -> Result<CartRecord, CartError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(CartError::MissingUser);
        }
        Ok(self
            .repo
            .load_cart(user_id)
            .await?
            .unwrap_or_else(|| CartRecord::empty(user_id)))
    }

    async fn save(&self, mut cart: CartRecord) -> Result<CartRecord, CartError> {
        cart.updated_at = OffsetDateTime::now_utc();
        self.repo.save_cart(&cart).await?;
        Ok(cart)
    }
}

fn validate_line(quantity: i32, price: f64) -> Result<(), CartError> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity);
    }
    if !price.is_finite() || price < 0.0 {
        return Err(CartError::InvalidPrice);
    }
    Ok(())
}

fn add_line(cart: &mut CartRecord, product_id: i64, quantity: i32, price: f64) {
    match cart
        .items
        .iter_mut()
        .find(|line| line.product_id == product_id)
    {
        Some(line) => {
            line.quantity = line.quantity.saturating_add(quantity);
            line.price = price;
        }
        None => cart.items.push(CartItem {
            product_id,
            quantity,
            price,
            added_at: OffsetDateTime::now_utc(),
        }),
    }
}

fn find_line(cart: &CartRecord, product_id: i64) -> Result<usize, CartError> {
    cart.items
        .iter()
        .position(|line| line.product_id == product_id)
        .ok_or(CartError::ItemNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_an_existing_product_merges_quantity() {
        let mut cart = CartRecord::empty("u1");
        add_line(&mut cart, 7, 2, 10.0);
        add_line(&mut cart, 7, 3, 12.5);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.items[0].price, 12.5);
    }

    #[test]
    fn line_validation_rejects_bad_values() {
        assert!(matches!(
            validate_line(0, 1.0),
            Err(CartError::InvalidQuantity)
        ));
        assert!(matches!(
            validate_line(1, -0.01),
            Err(CartError::InvalidPrice)
        ));
        assert!(matches!(
            validate_line(1, f64::NAN),
            Err(CartError::InvalidPrice)
        ));
        assert!(validate_line(1, 0.0).is_ok());
    }
}
