/// Database layer for Gauss
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded sqlx migrations
/// - `seed`: idempotent catalog and demo-account seeding
///
/// Models live in the crate-level `models` module.

pub mod migrations;
pub mod pool;
pub mod seed;
