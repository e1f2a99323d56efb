/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength policy
/// - [`jwt`]: Access/refresh token issuing and validation
/// - [`middleware`]: Bearer header authentication and the request `AuthContext`
/// - [`authorization`]: Role and ownership checks
///
/// # Example
///
/// ```no_run
/// use bookify_shared::auth::password::{hash_password, verify_password};
/// use bookify_shared::auth::jwt::issue_token_pair;
/// use bookify_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sunny-beach-42")?;
/// assert!(verify_password("Sunny-beach-42", &hash)?);
///
/// let (access, refresh) = issue_token_pair(Uuid::new_v4(), UserRole::Guest, "secret-key-of-32-bytes-or-more!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
