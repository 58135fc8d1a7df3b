//! First-start provisioning of the admin account.

use gaestefotos_core::roles::ROLE_ADMIN_ID;
use gaestefotos_db::models::user::CreateUser;
use gaestefotos_db::repositories::UserRepo;
use sqlx::PgPool;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

const ADMIN_DISPLAY_NAME: &str = "Administrator";

/// Create the configured admin unless an admin account already exists.
///
/// Returns `true` when a user was created.
pub async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> AppResult<bool> {
    if UserRepo::exists_with_role(pool, ROLE_ADMIN_ID).await? {
        return Ok(false);
    }
    validate_password_strength(&admin.password).map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: admin.email.trim().to_string(),
            password_hash,
            display_name: ADMIN_DISPLAY_NAME.into(),
            role_id: ROLE_ADMIN_ID,
        },
    )
    .await?;
    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(true)
}
