/// Middleware for the API server
///
/// - `security`: security headers on every response
/// - `rate_limit`: Redis token-bucket throttling

pub mod rate_limit;
pub mod security;
