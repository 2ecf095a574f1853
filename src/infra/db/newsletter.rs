use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::{OffsetPage, PageRequest},
    application::repos::{
        CreateSubscriberParams, LabelCount, MonthlyCount, NewsletterRepo, RepoError,
        decode_json_column,
    },
    domain::entities::SubscriberRecord,
    domain::types::{SubscriberStatus, SubscriptionSource},
};

use super::{PostgresRepositories, map_sqlx_error};

const SUBSCRIBER_COLUMNS: &str = "id, email, name, status, subscription_source, preferences, \
    ip_address, user_agent, subscribed_at, last_email_sent, unsubscribed_at, email_verified, \
    verification_token";

#[derive(sqlx::FromRow)]
struct SubscriberRow {
    id: Uuid,
    email: String,
    name: String,
    status: SubscriberStatus,
    subscription_source: SubscriptionSource,
    preferences: JsonValue,
    ip_address: String,
    user_agent: String,
    subscribed_at: OffsetDateTime,
    last_email_sent: Option<OffsetDateTime>,
    unsubscribed_at: Option<OffsetDateTime>,
    email_verified: bool,
    verification_token: Option<String>,
}

impl TryFrom<SubscriberRow> for SubscriberRecord {
    type Error = RepoError;

    fn try_from(row: SubscriberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            status: row.status,
            subscription_source: row.subscription_source,
            preferences: decode_json_column("preferences", row.preferences)?,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            subscribed_at: row.subscribed_at,
            last_email_sent: row.last_email_sent,
            unsubscribed_at: row.unsubscribed_at,
            email_verified: row.email_verified,
            verification_token: row.verification_token,
        })
    }
}

#[async_trait]
impl NewsletterRepo for PostgresRepositories {
    async fn find_by_email(&self, email: &str) -> Result<Option<SubscriberRecord>, RepoError> {
        let row = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM newsletter_subscribers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(SubscriberRecord::try_from).transpose()
    }

    async fn create_subscriber(
        &self,
        params: CreateSubscriberParams,
    ) -> Result<SubscriberRecord, RepoError> {
        let row = sqlx::query_as::<_, SubscriberRow>(&format!(
            r#"
            INSERT INTO newsletter_subscribers (
                id, email, name, status, subscription_source, preferences,
                ip_address, user_agent, subscribed_at, verification_token
            )
            VALUES ($1, $2, $3, 'active', $4, $5, $6, $7, $8, $9)
            RETURNING {SUBSCRIBER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&params.email)
        .bind(&params.name)
        .bind(params.subscription_source)
        .bind(Json(params.preferences))
        .bind(&params.ip_address)
        .bind(&params.user_agent)
        .bind(params.subscribed_at)
        .bind(&params.verification_token)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        SubscriberRecord::try_from(row)
    }

    async fn save_subscriber(
        &self,
        record: &SubscriberRecord,
    ) -> Result<SubscriberRecord, RepoError> {
        let row = sqlx::query_as::<_, SubscriberRow>(&format!(
            r#"
            UPDATE newsletter_subscribers
            SET name = $2,
                status = $3,
                subscription_source = $4,
                preferences = $5,
                ip_address = $6,
                user_agent = $7,
                subscribed_at = $8,
                last_email_sent = $9,
                unsubscribed_at = $10,
                email_verified = $11,
                verification_token = $12
            WHERE id = $1
            RETURNING {SUBSCRIBER_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(&record.name)
        .bind(record.status)
        .bind(record.subscription_source)
        .bind(Json(record.preferences))
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .bind(record.subscribed_at)
        .bind(record.last_email_sent)
        .bind(record.unsubscribed_at)
        .bind(record.email_verified)
        .bind(&record.verification_token)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        SubscriberRecord::try_from(row)
    }

    async fn count_subscribers(&self, status: Option<SubscriberStatus>) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM newsletter_subscribers
            WHERE ($1::subscriber_status IS NULL OR status = $1)
            "#,
        )
        .bind(status)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn monthly_growth(&self, since: OffsetDateTime) -> Result<Vec<MonthlyCount>, RepoError> {
        let rows = sqlx::query_as::<_, (i32, i32, i64)>(
            r#"
            SELECT
                EXTRACT(YEAR FROM subscribed_at AT TIME ZONE 'UTC')::int AS year,
                EXTRACT(MONTH FROM subscribed_at AT TIME ZONE 'UTC')::int AS month,
                COUNT(*) AS count
            FROM newsletter_subscribers
            WHERE status = 'active' AND subscribed_at >= $1
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(year, month, count)| {
                let month = u8::try_from(month).map_err(|_| RepoError::Integrity {
                    message: format!("month out of range: {month}"),
                })?;
                Ok(MonthlyCount {
                    year,
                    month,
                    count: Self::convert_count(count)?,
                })
            })
            .collect()
    }

    async fn source_counts(&self) -> Result<Vec<LabelCount>, RepoError> {
        let rows = sqlx::query_as::<_, (SubscriptionSource, i64)>(
            r#"
            SELECT subscription_source, COUNT(*)
            FROM newsletter_subscribers
            GROUP BY subscription_source
            ORDER BY COUNT(*) DESC, subscription_source
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(source, count)| {
                Ok(LabelCount {
                    label: source.as_str().to_string(),
                    count: Self::convert_count(count)?,
                })
            })
            .collect()
    }

    async fn list_subscribers(
        &self,
        status: Option<SubscriberStatus>,
        page: PageRequest,
    ) -> Result<OffsetPage<SubscriberRecord>, RepoError> {
        let total = self.count_subscribers(status).await?;

        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            r#"
            SELECT {SUBSCRIBER_COLUMNS}
            FROM newsletter_subscribers
            WHERE ($1::subscriber_status IS NULL OR status = $1)
            ORDER BY subscribed_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(page.limit_i64())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .into_iter()
            .map(SubscriberRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OffsetPage { items, total })
    }
}
