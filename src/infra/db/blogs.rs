use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Postgres, QueryBuilder, types::Json};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::OffsetPage,
    application::repos::{
        BlogListQuery, BlogPostsRepo, BlogPostsWriteRepo, BlogSortBy, CreateBlogPostParams,
        LikeOutcome, RepoError, UpdateBlogPostParams, decode_json_column,
    },
    domain::entities::{BlogComment, BlogLikes, BlogPostRecord},
    domain::types::BlogStatus,
};

use super::{PostgresRepositories, map_sqlx_error, util::like_pattern};

const BLOG_COLUMNS: &str = "p.id, p.title, p.slug, p.short_description, p.content, p.image, \
    p.author, p.category, p.tags, p.featured, p.trending, p.status, p.published_at, \
    p.read_time, p.likes_count, p.likes_users, p.views, p.comments, p.meta_title, \
    p.meta_description, p.meta_keywords, p.created_at, p.updated_at";

#[derive(sqlx::FromRow)]
struct BlogPostRow {
    id: Uuid,
    title: String,
    slug: String,
    short_description: String,
    content: String,
    image: String,
    author: JsonValue,
    category: String,
    tags: Vec<String>,
    featured: bool,
    trending: bool,
    status: BlogStatus,
    published_at: Option<OffsetDateTime>,
    read_time: i32,
    likes_count: i64,
    likes_users: Vec<i64>,
    views: i64,
    comments: JsonValue,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_keywords: Vec<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<BlogPostRow> for BlogPostRecord {
    type Error = RepoError;

    fn try_from(row: BlogPostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            short_description: row.short_description,
            content: row.content,
            image: row.image,
            author: decode_json_column("author", row.author)?,
            category: row.category,
            tags: row.tags,
            featured: row.featured,
            trending: row.trending,
            status: row.status,
            published_at: row.published_at,
            read_time: row.read_time,
            likes: BlogLikes {
                count: row.likes_count,
                users: row.likes_users,
            },
            views: row.views,
            comments: decode_json_column("comments", row.comments)?,
            meta_title: row.meta_title,
            meta_description: row.meta_description,
            meta_keywords: row.meta_keywords,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_rows(rows: Vec<BlogPostRow>) -> Result<Vec<BlogPostRecord>, RepoError> {
    rows.into_iter().map(BlogPostRecord::try_from).collect()
}

fn convert_row(row: Option<BlogPostRow>) -> Result<Option<BlogPostRecord>, RepoError> {
    row.map(BlogPostRecord::try_from).transpose()
}

impl PostgresRepositories {
    fn apply_blog_filters<'q>(qb: &mut QueryBuilder<'q, Postgres>, query: &'q BlogListQuery) {
        if let Some(search) = query.search_filter() {
            let pattern = like_pattern(search);
            qb.push(" AND (p.title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR p.short_description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }

        if let Some(category) = query.category_filter() {
            qb.push(" AND p.category = ");
            qb.push_bind(category);
        }

        if let Some(tag) = query.tag_filter() {
            qb.push(" AND ");
            qb.push_bind(tag);
            qb.push(" = ANY(p.tags)");
        }

        if let Some(status) = query.status {
            qb.push(" AND p.status = ");
            qb.push_bind(status);
        }
    }

    fn push_blog_order(qb: &mut QueryBuilder<'_, Postgres>, query: &BlogListQuery) {
        let direction = query.sort_order.as_str().to_ascii_uppercase();
        match query.sort_by {
            BlogSortBy::Latest => {
                qb.push(format!(" ORDER BY p.published_at {direction} NULLS LAST"));
            }
            BlogSortBy::Name => {
                qb.push(format!(" ORDER BY p.title {direction}"));
            }
            BlogSortBy::MostViewed => {
                qb.push(" ORDER BY p.views DESC");
            }
            BlogSortBy::MostLiked => {
                qb.push(" ORDER BY p.likes_count DESC");
            }
        }
        qb.push(", p.created_at DESC, p.id DESC");
    }
}

#[async_trait]
impl BlogPostsRepo for PostgresRepositories {
    async fn list_posts(
        &self,
        query: &BlogListQuery,
    ) -> Result<OffsetPage<BlogPostRecord>, RepoError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM blog_posts p WHERE 1 = 1");
        Self::apply_blog_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let page = query.page_request();
        let mut qb = QueryBuilder::new(format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts p WHERE 1 = 1"
        ));
        Self::apply_blog_filters(&mut qb, query);
        Self::push_blog_order(&mut qb, query);
        qb.push(" LIMIT ");
        qb.push_bind(page.limit_i64());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<BlogPostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(OffsetPage {
            items: convert_rows(rows)?,
            total: Self::convert_count(total)?,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        convert_row(row)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "UPDATE blog_posts p SET views = p.views + 1 WHERE p.id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        convert_row(row)
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM blog_posts
                WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl BlogPostsWriteRepo for PostgresRepositories {
    async fn create_post(
        &self,
        params: CreateBlogPostParams,
    ) -> Result<BlogPostRecord, RepoError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            r#"
            INSERT INTO blog_posts AS p (
                id, title, slug, short_description, content, image, author, category, tags,
                featured, trending, status, published_at, read_time, meta_title,
                meta_description, meta_keywords
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&params.title)
        .bind(&params.slug)
        .bind(&params.short_description)
        .bind(&params.content)
        .bind(&params.image)
        .bind(Json(&params.author))
        .bind(&params.category)
        .bind(&params.tags)
        .bind(params.featured)
        .bind(params.trending)
        .bind(params.status)
        .bind(params.published_at)
        .bind(params.read_time)
        .bind(&params.meta_title)
        .bind(&params.meta_description)
        .bind(&params.meta_keywords)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        BlogPostRecord::try_from(row)
    }

    async fn update_post(
        &self,
        params: UpdateBlogPostParams,
    ) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            r#"
            UPDATE blog_posts AS p
            SET title = $2,
                slug = $3,
                short_description = $4,
                content = $5,
                image = $6,
                author = $7,
                category = $8,
                tags = $9,
                featured = $10,
                trending = $11,
                status = $12,
                published_at = $13,
                read_time = $14,
                meta_title = $15,
                meta_description = $16,
                meta_keywords = $17,
                updated_at = now()
            WHERE p.id = $1
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(params.id)
        .bind(&params.title)
        .bind(&params.slug)
        .bind(&params.short_description)
        .bind(&params.content)
        .bind(&params.image)
        .bind(Json(&params.author))
        .bind(&params.category)
        .bind(&params.tags)
        .bind(params.featured)
        .bind(params.trending)
        .bind(params.status)
        .bind(params.published_at)
        .bind(params.read_time)
        .bind(&params.meta_title)
        .bind(&params.meta_description)
        .bind(&params.meta_keywords)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        convert_row(row)
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "DELETE FROM blog_posts AS p WHERE p.id = $1 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        convert_row(row)
    }

    async fn add_comment(
        &self,
        id: Uuid,
        comment: BlogComment,
    ) -> Result<Option<u64>, RepoError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE blog_posts
            SET comments = comments || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE id = $1
            RETURNING jsonb_array_length(comments)::bigint
            "#,
        )
        .bind(id)
        .bind(Json(&comment))
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        count.map(Self::convert_count).transpose()
    }

    async fn toggle_like(
        &self,
        id: Uuid,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let current = sqlx::query_as::<_, (i64, Vec<i64>)>(
            "SELECT likes_count, likes_users FROM blog_posts WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some((count, users)) = current else {
            return Ok(None);
        };

        let mut likes = BlogLikes { count, users };
        let liked = likes.toggle(user_id);

        sqlx::query("UPDATE blog_posts SET likes_count = $2, likes_users = $3 WHERE id = $1")
            .bind(id)
            .bind(likes.count)
            .bind(&likes.users)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Some(LikeOutcome {
            liked,
            total_likes: likes.count,
        }))
    }
}
