//! Domain rules for the Gästefotos platform.
//!
//! Everything in this crate is pure: validation, state machines and small
//! algorithms shared by the database and HTTP layers.

pub mod api_keys;
pub mod booth;
pub mod error;
pub mod event_config;
pub mod feature_flags;
pub mod hashing;
pub mod invoice;
pub mod media;
pub mod moderation;
pub mod mosaic;
pub mod packages;
pub mod pagination;
pub mod rate_limit;
pub mod roles;
pub mod slug;
pub mod types;
pub mod upload_window;
pub mod workflow;
