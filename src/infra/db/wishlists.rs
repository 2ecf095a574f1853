use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Postgres, QueryBuilder, types::Json};
use time::OffsetDateTime;

use crate::{
    application::repos::{RepoError, WishlistsRepo, decode_json_column},
    domain::entities::{WishlistItem, WishlistRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct WishlistItemRow {
    product_id: i64,
    added_at: OffsetDateTime,
    product_snapshot: Option<JsonValue>,
}

impl TryFrom<WishlistItemRow> for WishlistItem {
    type Error = RepoError;

    fn try_from(row: WishlistItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            added_at: row.added_at,
            product_snapshot: row
                .product_snapshot
                .map(|value| decode_json_column("product_snapshot", value))
                .transpose()?,
        })
    }
}

#[async_trait]
impl WishlistsRepo for PostgresRepositories {
    async fn load_wishlist(&self, user_id: &str) -> Result<Option<WishlistRecord>, RepoError> {
        let updated_at = sqlx::query_scalar::<_, OffsetDateTime>(
            "SELECT updated_at FROM wishlists WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(updated_at) = updated_at else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, WishlistItemRow>(
            r#"
            SELECT product_id, added_at, product_snapshot
            FROM wishlist_items
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(WishlistItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(WishlistRecord {
            user_id: user_id.to_string(),
            items,
            updated_at,
        }))
    }

    async fn save_wishlist(&self, wishlist: &WishlistRecord) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(
            r#"
            INSERT INTO wishlists (user_id, updated_at)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&wishlist.user_id)
        .bind(wishlist.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1")
            .bind(&wishlist.user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        if !wishlist.items.is_empty() {
            let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(
                "INSERT INTO wishlist_items (user_id, position, product_id, added_at, product_snapshot) ",
            );
            qb.push_values(
                wishlist.items.iter().enumerate(),
                |mut row, (position, item)| {
                    row.push_bind(&wishlist.user_id)
                        .push_bind(position as i32)
                        .push_bind(item.product_id)
                        .push_bind(item.added_at)
                        .push_bind(item.product_snapshot.as_ref().map(Json));
                },
            );
            qb.build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)
    }
}
