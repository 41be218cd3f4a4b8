/// API route handlers, one module per resource
///
/// - `health`: liveness and database check
/// - `auth`: register, login, logout, current user
/// - `tools`, `collections`: the caller's own tools and their grouping
/// - `settings`, `users`: preferences, profile and password
/// - `explore`: curated catalog and personalized suggestions
/// - `resources`, `categories`, `tags`: the public resource catalog

use crate::error::{ApiError, ApiResult};
use gauss_shared::slug::slugify;
use serde::{Deserialize, Deserializer, Serialize};

pub mod auth;
pub mod categories;
pub mod collections;
pub mod explore;
pub mod health;
pub mod resources;
pub mod settings;
pub mod tags;
pub mod tools;
pub mod users;

/// `{"message": ...}` acknowledgement body
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`)
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Rejects a title or name whose slug would be empty
pub(crate) fn require_slug(field: &str, value: &str) -> ApiResult<()> {
    if slugify(value).is_empty() {
        return Err(ApiError::field(
            field,
            format!("The {field} must contain at least one letter or digit"),
        ));
    }
    Ok(())
}
