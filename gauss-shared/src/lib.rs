//! # Gauss Shared Library
//!
//! Persistence and authentication building blocks used by the Gauss API
//! server and the seeding binary.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, embedded migrations, seeding
//! - `models`: one module per table with its SQL
//! - `auth`: password hashing, bearer tokens, the request auth context
//! - `slug`: URL slugs for catalog rows

pub mod auth;
pub mod db;
pub mod models;
pub mod slug;

/// Current version of the Gauss shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
