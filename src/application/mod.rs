//! Application services: storefront use-cases over repository traits.

pub mod admin_token;
pub mod blog;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod error;
pub mod health;
pub mod newsletter;
pub mod pagination;
pub mod repos;
pub mod wishlist;
