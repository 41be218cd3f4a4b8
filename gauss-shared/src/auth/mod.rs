/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: bearer token signing and validation
/// - [`context`]: the authenticated caller handed to route handlers
///
/// Revocation lives in the database (`models::access_token`): a token is
/// only accepted while its `jti` row exists.

pub mod context;
pub mod jwt;
pub mod password;
