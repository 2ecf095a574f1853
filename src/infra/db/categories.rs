use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CategoriesRepo, CategoriesWriteRepo, CategoryQueryFilter, CreateCategoryParams,
        RepoError, UpdateCategoryParams,
    },
    domain::entities::CategoryRecord,
    domain::types::CategoryKind,
};

use super::{PostgresRepositories, map_sqlx_error, util::like_pattern};

const CATEGORY_COLUMNS: &str = "id, kind, name, slug, description, image, icon, is_active, \
    parent_category, meta_title, meta_description, sort_order, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    kind: CategoryKind,
    name: String,
    slug: String,
    description: String,
    image: String,
    icon: String,
    is_active: bool,
    parent_category: Option<Uuid>,
    meta_title: String,
    meta_description: String,
    sort_order: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            name: row.name,
            slug: row.slug,
            description: row.description,
            image: row.image,
            icon: row.icon,
            is_active: row.is_active,
            parent_category: row.parent_category,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(
        &self,
        kind: CategoryKind,
        filter: &CategoryQueryFilter,
    ) -> Result<Vec<CategoryRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE kind = "
        ));
        qb.push_bind(kind);

        if let Some(active) = filter.active {
            qb.push(" AND is_active = ");
            qb.push_bind(active);
        }

        if let Some(search) = filter.search.as_deref().filter(|value| !value.is_empty()) {
            qb.push(" AND name ILIKE ");
            qb.push_bind(like_pattern(search));
        }

        qb.push(" ORDER BY sort_order ASC, name ASC");

        let rows = qb
            .build_query_as::<CategoryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CategoryRecord::from).collect())
    }

    async fn find_by_id(
        &self,
        kind: CategoryKind,
        id: Uuid,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE kind = $1 AND id = $2"
        ))
        .bind(kind)
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn find_conflict(
        &self,
        kind: CategoryKind,
        name: &str,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categories
            WHERE kind = $1
              AND (name = $2 OR slug = $3)
              AND ($4::uuid IS NULL OR id <> $4)
            LIMIT 1
            "#
        ))
        .bind(kind)
        .bind(name)
        .bind(slug)
        .bind(exclude)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn max_order(&self, kind: CategoryKind) -> Result<Option<i32>, RepoError> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(sort_order) FROM categories WHERE kind = $1",
        )
        .bind(kind)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_categories(
        &self,
        kind: CategoryKind,
        active: Option<bool>,
    ) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM categories
            WHERE kind = $1 AND ($2::boolean IS NULL OR is_active = $2)
            "#,
        )
        .bind(kind)
        .bind(active)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}

#[async_trait]
impl CategoriesWriteRepo for PostgresRepositories {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            INSERT INTO categories (
                id, kind, name, slug, description, image, icon, is_active,
                parent_category, meta_title, meta_description, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(params.kind)
        .bind(&params.name)
        .bind(&params.slug)
        .bind(&params.description)
        .bind(&params.image)
        .bind(&params.icon)
        .bind(params.is_active)
        .bind(params.parent_category)
        .bind(&params.meta_title)
        .bind(&params.meta_description)
        .bind(params.order)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CategoryRecord::from(row))
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            r#"
            UPDATE categories
            SET name = $3,
                slug = $4,
                description = $5,
                image = $6,
                icon = $7,
                is_active = $8,
                parent_category = $9,
                meta_title = $10,
                meta_description = $11,
                sort_order = $12,
                updated_at = now()
            WHERE kind = $1 AND id = $2
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(params.kind)
        .bind(params.id)
        .bind(&params.name)
        .bind(&params.slug)
        .bind(&params.description)
        .bind(&params.image)
        .bind(&params.icon)
        .bind(params.is_active)
        .bind(params.parent_category)
        .bind(&params.meta_title)
        .bind(&params.meta_description)
        .bind(params.order)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn delete_category(&self, kind: CategoryKind, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM categories WHERE kind = $1 AND id = $2")
            .bind(kind)
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn reorder_categories(
        &self,
        kind: CategoryKind,
        ids: &[Uuid],
    ) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        for (index, id) in ids.iter().enumerate() {
            let order = i32::try_from(index).map_err(|_| RepoError::InvalidInput {
                message: "too many categories to reorder".to_string(),
            })?;
            sqlx::query(
                "UPDATE categories SET sort_order = $3, updated_at = now() WHERE kind = $1 AND id = $2",
            )
            .bind(kind)
            .bind(id)
            .bind(order)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)
    }
}
