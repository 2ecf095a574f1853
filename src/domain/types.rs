//! Shared domain enumerations aligned with persisted database enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "blog_status", rename_all = "snake_case")]
pub enum BlogStatus {
    Draft,
    Published,
    Archived,
}

impl BlogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
            BlogStatus::Archived => "archived",
        }
    }
}

impl FromStr for BlogStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::validation(format!(
                "unknown blog status `{other}`"
            ))),
        }
    }
}

/// Which catalogue a category belongs to. Product and blog categories share
/// one table and one service; every query is scoped by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "category_kind", rename_all = "snake_case")]
pub enum CategoryKind {
    Product,
    Blog,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKind::Product => "product",
            CategoryKind::Blog => "blog",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Product => "Category",
            CategoryKind::Blog => "Blog category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "subscriber_status", rename_all = "snake_case")]
pub enum SubscriberStatus {
    Active,
    Unsubscribed,
    Pending,
}

impl FromStr for SubscriberStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "unsubscribed" => Ok(Self::Unsubscribed),
            "pending" => Ok(Self::Pending),
            other => Err(DomainError::validation(format!(
                "unknown subscriber status `{other}`"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "subscription_source", rename_all = "snake_case")]
pub enum SubscriptionSource {
    #[default]
    Website,
    Checkout,
    Popup,
    Social,
}

impl SubscriptionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionSource::Website => "website",
            SubscriptionSource::Checkout => "checkout",
            SubscriptionSource::Popup => "popup",
            SubscriptionSource::Social => "social",
        }
    }
}

impl FromStr for SubscriptionSource {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "website" => Ok(Self::Website),
            "checkout" => Ok(Self::Checkout),
            "popup" => Ok(Self::Popup),
            "social" => Ok(Self::Social),
            other => Err(DomainError::validation(format!(
                "unknown subscription source `{other}`"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "inquiry_type", rename_all = "snake_case")]
pub enum InquiryType {
    #[default]
    General,
    Support,
    Business,
    Feedback,
}

impl InquiryType {
    pub fn as_str(self) -> &'static str {
        match self {
            InquiryType::General => "general",
            InquiryType::Support => "support",
            InquiryType::Business => "business",
            InquiryType::Feedback => "feedback",
        }
    }
}

impl FromStr for InquiryType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "support" => Ok(Self::Support),
            "business" => Ok(Self::Business),
            "feedback" => Ok(Self::Feedback),
            other => Err(DomainError::validation(format!(
                "unknown inquiry type `{other}`"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "contact_status", rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Resolved,
}

impl ContactStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Resolved => "resolved",
        }
    }
}

impl FromStr for ContactStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            "resolved" => Ok(Self::Resolved),
            other => Err(DomainError::validation(format!(
                "unknown contact status `{other}`"
            ))),
        }
    }
}

impl fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_case_insensitively() {
        assert_eq!(
            "Published".parse::<BlogStatus>().expect("status"),
            BlogStatus::Published
        );
        assert_eq!(
            " SUPPORT ".parse::<InquiryType>().expect("inquiry"),
            InquiryType::Support
        );
        assert!("spam".parse::<ContactStatus>().is_err());
    }

    #[test]
    fn defaults_match_storefront_forms() {
        assert_eq!(SubscriptionSource::default(), SubscriptionSource::Website);
        assert_eq!(InquiryType::default(), InquiryType::General);
        assert_eq!(ContactStatus::default(), ContactStatus::New);
    }
}
