/// Middleware for the API server
///
/// - `security`: security response headers
///
/// JWT authentication lives in [`crate::app::jwt_auth_layer`].

pub mod security;
