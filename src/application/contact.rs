use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::{PageRequest, Pagination};
use crate::application::repos::{
    ContactQueryFilter, ContactsRepo, CreateContactParams, LabelCount, RepoError,
};
use crate::domain::email::normalize_email;
use crate::domain::entities::ContactRecord;
use crate::domain::error::DomainError;
use crate::domain::types::{ContactStatus, InquiryType};

pub const DEFAULT_SUBMISSION_PAGE_LIMIT: u32 = 20;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact submission not found")]
    NotFound,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct SubmitContactCommand {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub inquiry_type: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPage {
    pub submissions: Vec<ContactRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: u64,
    pub by_status: Vec<LabelCount>,
    pub by_inquiry_type: Vec<LabelCount>,
}

#[derive(Clone)]
pub struct ContactService {
    repo: Arc<dyn ContactsRepo>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactsRepo>) -> Self {
        Self { repo }
    }

    pub async fn submit(&self, command: SubmitContactCommand) -> Result<ContactRecord, ContactError> {
        let name = required(&command.name, "name")?;
        let subject = required(&command.subject, "subject")?;
        let message = required(&command.message, "message")?;
        if command.email.trim().is_empty() {
            return Err(ContactError::MissingField("email"));
        }
        let email = normalize_email(&command.email)?;
        let inquiry_type = match command.inquiry_type.as_deref().map(str::trim) {
            None | Some("") => InquiryType::default(),
            Some(raw) => raw.parse::<InquiryType>()?,
        };

        let record = self
            .repo
            .create_submission(CreateContactParams {
                name,
                email,
                subject,
                message,
                inquiry_type,
                ip_address: command.ip_address,
                user_agent: command.user_agent,
            })
            .await?;
        info!(
            target = "pinkdreams::contact",
            submission_id = %record.id,
            inquiry_type = record.inquiry_type.as_str(),
            "Contact submission received"
        );
        Ok(record)
    }

    pub async fn list(
        &self,
        status: Option<&str>,
        inquiry_type: Option<&str>,
        page: PageRequest,
    ) -> Result<SubmissionPage, ContactError> {
        let filter = ContactQueryFilter {
            status: parse_filter::<ContactStatus>(status)?,
            inquiry_type: parse_filter::<InquiryType>(inquiry_type)?,
        };
        let result = self.repo.list_submissions(&filter, page).await?;
        Ok(SubmissionPage {
            pagination: Pagination::new(page, result.total),
            submissions: result.items,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<ContactRecord, ContactError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ContactError::NotFound)
    }

    /// Move a submission through its workflow. Replies are timestamped.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<ContactRecord, ContactError> {
        let status = status.parse::<ContactStatus>()?;
        let replied_at = (status == ContactStatus::Replied).then(OffsetDateTime::now_utc);
        self.repo
            .update_status(id, status, replied_at)
            .await?
            .ok_or(ContactError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ContactError> {
        if self.repo.delete_submission(id).await? {
            Ok(())
        } else {
            Err(ContactError::NotFound)
        }
    }

    pub async fn stats(&self) -> Result<ContactStats, ContactError> {
        Ok(ContactStats {
            total: self.repo.count_submissions().await?,
            by_status: self.repo.status_counts().await?,
            by_inquiry_type: self.repo.inquiry_type_counts().await?,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ContactError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// `None`, empty and `all` mean no filter.
fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>, DomainError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => value.parse::<T>().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_disables_filters() {
        assert_eq!(parse_filter::<ContactStatus>(Some("All")).expect("ok"), None);
        assert_eq!(parse_filter::<ContactStatus>(None).expect("ok"), None);
        assert_eq!(
            parse_filter::<InquiryType>(Some("business")).expect("ok"),
            Some(InquiryType::Business)
        );
        assert!(parse_filter::<ContactStatus>(Some("spam")).is_err());
    }
}
