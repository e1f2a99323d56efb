/// Startup tasks
///
/// Creates the first administrator from `ADMIN_EMAIL` and `ADMIN_PASSWORD`.

use crate::config::AdminConfig;
use bookify_shared::auth::password::{hash_password, validate_password_strength};
use bookify_shared::models::user::{CreateUser, UpdateUser, User, UserRole};
use sqlx::PgPool;
use tracing::{info, warn};

/// What `ensure_admin` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminBootstrap {
    Created,
    Promoted,
    AlreadyAdmin,
}

/// Makes sure the configured administrator exists
///
/// Registration is public, so an existing guest account with that email is
/// promoted only after its password is replaced by `ADMIN_PASSWORD`.
/// Whoever registered the address first loses access to it.
pub async fn ensure_admin(pool: &PgPool, admin: &AdminConfig) -> anyhow::Result<AdminBootstrap> {
    validate_password_strength(&admin.password)
        .map_err(|e| anyhow::anyhow!("ADMIN_PASSWORD rejected: {}", e))?;

    if let Some(user) = User::find_by_email(pool, &admin.email).await? {
        if user.role.is_admin() {
            return Ok(AdminBootstrap::AlreadyAdmin);
        }

        User::update(
            pool,
            user.id,
            UpdateUser {
                role: Some(UserRole::Admin),
                password_hash: Some(hash_password(&admin.password)?),
                ..Default::default()
            },
        )
        .await?;

        warn!(user_id = %user.id, "Existing user promoted to admin, password reset");
        return Ok(AdminBootstrap::Promoted);
    }

    let user = User::create(
        pool,
        CreateUser {
            email: admin.email.clone(),
            name: "Administrator".to_string(),
            password_hash: hash_password(&admin.password)?,
            role: UserRole::Admin,
        },
    )
    .await?;

    info!(user_id = %user.id, "Bootstrap administrator created");
    Ok(AdminBootstrap::Created)
}
