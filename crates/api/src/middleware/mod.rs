//! Request extractors for the three kinds of caller.
//!
//! - [`auth::AuthUser`] -- host or admin identified by a JWT bearer token.
//! - [`rbac::RequireAdmin`] / [`rbac::RequireHost`] -- role gates on top of it.
//! - [`api_key::ApiKeyAuth`] -- booth hardware and integrations via `X-API-Key`.
//! - [`guest::GuestRateLimit`] -- anonymous guests, limited per client IP.

pub mod api_key;
pub mod auth;
pub mod guest;
pub mod rbac;
