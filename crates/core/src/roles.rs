//! Well-known role name constants.
//!
//! These must match the seed data in `0001_create_users.sql`.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_HOST: &str = "host";

/// Seeded role ids.
pub const ROLE_ADMIN_ID: DbId = 1;
pub const ROLE_HOST_ID: DbId = 2;
