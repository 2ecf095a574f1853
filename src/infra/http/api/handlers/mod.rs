//! API handlers organized by storefront resource.
//!
//! Helper functions for error conversion are defined here and shared across
//! modules.

mod blogs;
mod cart;
mod categories;
mod contact;
mod health;
mod newsletter;
mod wishlist;

pub use blogs::*;
pub use cart::*;
pub use categories::*;
pub use contact::*;
pub use health::*;
pub use newsletter::*;
pub use wishlist::*;

// ----- Shared error conversions -----

use axum::http::StatusCode;

use crate::application::blog::BlogError;
use crate::application::cart::CartError;
use crate::application::categories::CategoryError;
use crate::application::contact::ContactError;
use crate::application::newsletter::NewsletterError;
use crate::application::repos::RepoError;
use crate::application::wishlist::WishlistError;
use crate::domain::error::DomainError;
use crate::domain::slug::SlugError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("Resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Server error",
            Some(message),
        ),
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::NotFound { entity } => ApiError::not_found(entity),
        other => ApiError::validation("Validation failed", other.to_string()),
    }
}

fn slug_to_api(err: SlugError) -> ApiError {
    ApiError::validation("Could not derive a slug", err.to_string())
}

pub(crate) fn blog_to_api(err: BlogError) -> ApiError {
    match err {
        BlogError::NotFound => ApiError::not_found("Blog post not found"),
        BlogError::MissingField(_) | BlogError::EmptyComment => {
            ApiError::validation("Validation failed", err.to_string())
        }
        BlogError::Slug(err) => slug_to_api(err),
        BlogError::Domain(err) => domain_to_api(err),
        BlogError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn category_to_api(err: CategoryError) -> ApiError {
    match err {
        CategoryError::NotFound(_) => ApiError::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "Category not found",
            Some(err.to_string()),
        ),
        CategoryError::NameRequired | CategoryError::InvalidOrder => {
            ApiError::validation("Validation failed", err.to_string())
        }
        CategoryError::Duplicate(_) => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::ALREADY_EXISTS,
            "Category already exists",
            Some(err.to_string()),
        ),
        CategoryError::Slug(err) => slug_to_api(err),
        CategoryError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn newsletter_to_api(err: NewsletterError) -> ApiError {
    match err {
        NewsletterError::UnknownEmail => ApiError::not_found("Email not found in newsletter list"),
        NewsletterError::Domain(err) => domain_to_api(err),
        NewsletterError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn contact_to_api(err: ContactError) -> ApiError {
    match err {
        ContactError::NotFound => ApiError::not_found("Contact submission not found"),
        ContactError::MissingField(_) => ApiError::validation("All fields are required", err.to_string()),
        ContactError::Domain(err) => domain_to_api(err),
        ContactError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn cart_to_api(err: CartError) -> ApiError {
    match err {
        CartError::ItemNotFound => ApiError::not_found("Item not found in cart"),
        CartError::MissingUser | CartError::InvalidQuantity | CartError::InvalidPrice => {
            ApiError::validation("Validation failed", err.to_string())
        }
        CartError::Repo(err) => repo_to_api(err),
    }
}

pub(crate) fn wishlist_to_api(err: WishlistError) -> ApiError {
    match err {
        WishlistError::ItemNotFound => ApiError::not_found("Item not found in wishlist"),
        WishlistError::AlreadyPresent => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::ALREADY_EXISTS,
            "Item already in wishlist",
            None,
        ),
        WishlistError::MissingUser | WishlistError::NothingToMove => {
            ApiError::validation("Validation failed", err.to_string())
        }
        WishlistError::Cart(err) => cart_to_api(err),
        WishlistError::Repo(err) => repo_to_api(err),
    }
}
