//! # Gauss API
//!
//! HTTP layer of the Gauss backend, built on axum.
//!
//! - `app`: shared state, router and the bearer-token layer
//! - `config`: environment configuration
//! - `error`: `ApiError` and its JSON rendering
//! - `middleware`: security headers and Redis-backed throttling
//! - `routes`: one handler module per resource

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
