use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::{
    application::repos::{CartsRepo, RepoError},
    domain::entities::{CartItem, CartRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: i64,
    quantity: i32,
    price: f64,
    added_at: OffsetDateTime,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            added_at: row.added_at,
        }
    }
}

#[async_trait]
impl CartsRepo for PostgresRepositories {
    async fn load_cart(&self, user_id: &str) -> Result<Option<CartRecord>, RepoError> {
        let updated_at = sqlx::query_scalar::<_, OffsetDateTime>(
            "SELECT updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(updated_at) = updated_at else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT product_id, quantity, price, added_at
            FROM cart_items
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(Some(CartRecord {
            user_id: user_id.to_string(),
            items: rows.into_iter().map(CartItem::from).collect(),
            updated_at,
        }))
    }

    /// Replace the stored cart wholesale inside one transaction.
    async fn save_cart(&self, cart: &CartRecord) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO carts (user_id, updated_at)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&cart.user_id)
        .bind(cart.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(&cart.user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if !cart.items.is_empty() {
            let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO cart_items (user_id, position, product_id, quantity, price, added_at) ",
            );
            qb.push_values(cart.items.iter().enumerate(), |mut row, (position, item)| {
                row.push_bind(&cart.user_id)
                    .push_bind(position as i32)
                    .push_bind(item.product_id)
                    .push_bind(item.quantity)
                    .push_bind(item.price)
                    .push_bind(item.added_at);
            });
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)
    }
}
