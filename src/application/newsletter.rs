use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::{Pagination, PageRequest};
use crate::application::repos::{
    CreateSubscriberParams, LabelCount, MonthlyCount, NewsletterRepo, RepoError,
};
use crate::domain::email::normalize_email;
use crate::domain::entities::{NewsletterPreferences, SubscriberRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{SubscriberStatus, SubscriptionSource};

pub const DEFAULT_SUBSCRIBER_PAGE_LIMIT: u32 = 50;
const GROWTH_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("email not found in newsletter list")]
    UnknownEmail,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct SubscribeCommand {
    pub email: String,
    pub name: Option<String>,
    pub source: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub enum SubscribeOutcome {
    Subscribed(SubscriberRecord),
    Resubscribed(SubscriberRecord),
    AlreadySubscribed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Unsubscribed,
    AlreadyUnsubscribed,
}

/// Partial preference update; absent flags keep their stored value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub promotions: Option<bool>,
    pub new_products: Option<bool>,
    pub style_guides: Option<bool>,
}

impl PreferencesPatch {
    fn apply(self, current: NewsletterPreferences) -> NewsletterPreferences {
        NewsletterPreferences {
            promotions: self.promotions.unwrap_or(current.promotions),
            new_products: self.new_products.unwrap_or(current.new_products),
            style_guides: self.style_guides.unwrap_or(current.style_guides),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterStats {
    pub total_subscribers: u64,
    pub active_subscribers: u64,
    pub unsubscribed_count: u64,
    pub pending_count: u64,
    pub monthly_growth: Vec<MonthlyCount>,
    pub source_stats: Vec<LabelCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriberPage {
    pub subscribers: Vec<SubscriberRecord>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct NewsletterService {
    repo: Arc<dyn NewsletterRepo>,
}

impl NewsletterService {
    pub fn new(repo: Arc<dyn NewsletterRepo>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(
        &self,
        command: SubscribeCommand,
    ) -> Result<SubscribeOutcome, NewsletterError> {
        let email = normalize_email(&command.email)?;
        let name = command
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let source = match command.source.as_deref().map(str::trim) {
            None | Some("") => SubscriptionSource::default(),
            Some(raw) => raw.parse::<SubscriptionSource>()?,
        };

        if let Some(mut existing) = self.repo.find_by_email(&email).await? {
            if existing.status == SubscriberStatus::Active {
                return Ok(SubscribeOutcome::AlreadySubscribed);
            }

            existing.status = SubscriberStatus::Active;
            existing.subscribed_at = OffsetDateTime::now_utc();
            existing.unsubscribed_at = None;
            if let Some(name) = name {
                existing.name = name;
            }
            let saved = self.repo.save_subscriber(&existing).await?;
            info!(
                target = "pinkdreams::newsletter",
                subscriber_id = %saved.id,
                "Newsletter subscriber reactivated"
            );
            return Ok(SubscribeOutcome::Resubscribed(saved));
        }

        let params = CreateSubscriberParams {
            email,
            name: name.unwrap_or_default(),
            subscription_source: source,
            preferences: NewsletterPreferences::default(),
            ip_address: command.ip_address,
            user_agent: command.user_agent,
            verification_token: verification_token(),
            subscribed_at: OffsetDateTime::now_utc(),
        };
        let created = self.repo.create_subscriber(params).await?;
        info!(
            target = "pinkdreams::newsletter",
            subscriber_id = %created.id,
            source = created.subscription_source.as_str(),
            "Newsletter subscriber created"
        );
        Ok(SubscribeOutcome::Subscribed(created))
    }

    pub async fn unsubscribe(&self, email: &str) -> Result<UnsubscribeOutcome, NewsletterError> {
        let mut subscriber = self.find(email).await?;
        if subscriber.status == SubscriberStatus::Unsubscribed {
            return Ok(UnsubscribeOutcome::AlreadyUnsubscribed);
        }

        subscriber.status = SubscriberStatus::Unsubscribed;
        subscriber.unsubscribed_at = Some(OffsetDateTime::now_utc());
        self.repo.save_subscriber(&subscriber).await?;
        Ok(UnsubscribeOutcome::Unsubscribed)
    }

    pub async fn update_preferences(
        &self,
        email: &str,
        patch: Option<PreferencesPatch>,
    ) -> Result<NewsletterPreferences, NewsletterError> {
        let mut subscriber = self.find(email).await?;
        let Some(patch) = patch else {
            return Ok(subscriber.preferences);
        };

        subscriber.preferences = patch.apply(subscriber.preferences);
        let saved = self.repo.save_subscriber(&subscriber).await?;
        Ok(saved.preferences)
    }

    pub async fn stats(&self) -> Result<NewsletterStats, NewsletterError> {
        let since = OffsetDateTime::now_utc() - Duration::days(GROWTH_WINDOW_DAYS);
        Ok(NewsletterStats {
            total_subscribers: self.repo.count_subscribers(None).await?,
            active_subscribers: self
                .repo
                .count_subscribers(Some(SubscriberStatus::Active))
                .await?,
            unsubscribed_count: self
                .repo
                .count_subscribers(Some(SubscriberStatus::Unsubscribed))
                .await?,
            pending_count: self
                .repo
                .count_subscribers(Some(SubscriberStatus::Pending))
                .await?,
            monthly_growth: self.repo.monthly_growth(since).await?,
            source_stats: self.repo.source_counts().await?,
        })
    }

    pub async fn list_subscribers(
        &self,
        status: Option<&str>,
        page: PageRequest,
    ) -> Result<SubscriberPage, NewsletterError> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(value) if value.eq_ignore_ascii_case("all") => None,
            Some(value) => Some(value.parse::<SubscriberStatus>()?),
        };
        let result = self.repo.list_subscribers(status, page).await?;
        Ok(SubscriberPage {
            pagination: Pagination::new(page, result.total),
            subscribers: result.items,
        })
    }

    async fn find(&self, email: &str) -> Result<SubscriberRecord, NewsletterError> {
        let email = normalize_email(email)?;
        self.repo
            .find_by_email(&email)
            .await?
            .ok_or(NewsletterError::UnknownEmail)
    }
}

/// 64 hex characters from two random v4 UUIDs.
fn verification_token() -> String {
    let mut bytes = [0_u8; 32];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_tokens_are_64_hex_chars() {
        let token = verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_ne!(token, verification_token());
    }

    #[test]
    fn preference_patch_merges_fields() {
        let patch = PreferencesPatch {
            promotions: Some(false),
            ..Default::default()
        };
        let merged = patch.apply(NewsletterPreferences::default());
        assert!(!merged.promotions);
        assert!(merged.new_products);
        assert!(merged.style_guides);
    }
}
