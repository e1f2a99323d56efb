/// Authorization checks
///
/// Two roles exist. Admins may do anything; guests may only read the public
/// catalogue and act on records they own.
///
/// # Example
///
/// ```no_run
/// # use bookify_shared::auth::authorization::require_owner_or_admin;
/// # use bookify_shared::auth::middleware::AuthContext;
/// # use uuid::Uuid;
/// # fn example(auth: AuthContext, reservation_owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// require_owner_or_admin(&auth, reservation_owner)?;
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Administrator role required")]
    AdminRequired,

    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_admin() {
        return Err(AuthzError::AdminRequired);
    }

    Ok(())
}

/// Requires the caller to own the resource or be an admin
pub fn require_owner_or_admin(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != owner_id && !auth.is_admin() {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}
