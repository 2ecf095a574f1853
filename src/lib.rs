//! Pink Dreams storefront backend.
//!
//! Blog, category, newsletter, contact, cart and wishlist APIs over
//! Postgres, with a Redis read-through cache in front of the blog reads.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
