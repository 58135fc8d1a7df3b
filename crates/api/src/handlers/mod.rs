//! Request handlers, one submodule per resource.
//!
//! Handlers delegate persistence to the repositories in `gaestefotos_db`,
//! rules to `gaestefotos_core`, and map failures via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod api_keys;
pub mod auth;
pub mod booth;
pub mod categories;
pub mod consent;
pub mod events;
pub mod feature_flags;
pub mod invoices;
pub mod mosaic;
pub mod ops;
pub mod packages;
pub mod photos;
pub mod workflows;
