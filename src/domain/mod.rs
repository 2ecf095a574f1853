//! Domain layer: storefront entities, enumerations and pure helpers.

pub mod content;
pub mod email;
pub mod entities;
pub mod error;
pub mod slug;
pub mod types;
