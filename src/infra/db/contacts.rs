use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::{OffsetPage, PageRequest},
    application::repos::{
        ContactQueryFilter, ContactsRepo, CreateContactParams, LabelCount, RepoError,
    },
    domain::entities::ContactRecord,
    domain::types::{ContactStatus, InquiryType},
};

use super::{PostgresRepositories, map_sqlx_error};

const CONTACT_COLUMNS: &str = "id, name, email, subject, message, inquiry_type, status, \
    ip_address, user_agent, created_at, replied_at";

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: Uuid,
    name: String,
    email: String,
    subject: String,
    message: String,
    inquiry_type: InquiryType,
    status: ContactStatus,
    ip_address: String,
    user_agent: String,
    created_at: OffsetDateTime,
    replied_at: Option<OffsetDateTime>,
}

impl From<ContactRow> for ContactRecord {
    fn from(row: ContactRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            inquiry_type: row.inquiry_type,
            status: row.status,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
            replied_at: row.replied_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_contact_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ContactQueryFilter) {
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(inquiry_type) = filter.inquiry_type {
            qb.push(" AND inquiry_type = ");
            qb.push_bind(inquiry_type);
        }
    }
}

#[async_trait]
impl ContactsRepo for PostgresRepositories {
    async fn create_submission(
        &self,
        params: CreateContactParams,
    ) -> Result<ContactRecord, RepoError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r#"
            INSERT INTO contact_submissions (
                id, name, email, subject, message, inquiry_type, ip_address, user_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(&params.email)
        .bind(&params.subject)
        .bind(&params.message)
        .bind(params.inquiry_type)
        .bind(&params.ip_address)
        .bind(&params.user_agent)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ContactRecord::from(row))
    }

    async fn list_submissions(
        &self,
        filter: &ContactQueryFilter,
        page: PageRequest,
    ) -> Result<OffsetPage<ContactRecord>, RepoError> {
        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM contact_submissions WHERE 1 = 1");
        Self::apply_contact_filter(&mut count_qb, filter);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions WHERE 1 = 1"
        ));
        Self::apply_contact_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(page.limit_i64());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<ContactRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(OffsetPage {
            items: rows.into_iter().map(ContactRecord::from).collect(),
            total: Self::convert_count(total)?,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ContactRecord>, RepoError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contact_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ContactRecord::from))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        replied_at: Option<OffsetDateTime>,
    ) -> Result<Option<ContactRecord>, RepoError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r#"
            UPDATE contact_submissions
            SET status = $2,
                replied_at = COALESCE($3, replied_at)
            WHERE id = $1
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(replied_at)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ContactRecord::from))
    }

    async fn delete_submission(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_submissions(&self) -> Result<u64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn status_counts(&self) -> Result<Vec<LabelCount>, RepoError> {
        let rows = sqlx::query_as::<_, (ContactStatus, i64)>(
            "SELECT status, COUNT(*) FROM contact_submissions GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok(LabelCount {
                    label: status.as_str().to_string(),
                    count: Self::convert_count(count)?,
                })
            })
            .collect()
    }

    async fn inquiry_type_counts(&self) -> Result<Vec<LabelCount>, RepoError> {
        let rows = sqlx::query_as::<_, (InquiryType, i64)>(
            r#"
            SELECT inquiry_type, COUNT(*)
            FROM contact_submissions
            GROUP BY inquiry_type
            ORDER BY inquiry_type
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(inquiry_type, count)| {
                Ok(LabelCount {
                    label: inquiry_type.as_str().to_string(),
                    count: Self::convert_count(count)?,
                })
            })
            .collect()
    }
}
