/// Display, notification and privacy preferences
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use gauss_shared::{
    auth::context::AuthContext,
    models::settings::{UpdateSettings, UserSettings, CARDS_PER_PAGE, VIEW_MODES},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    /// One of [`VIEW_MODES`]
    pub view_mode: Option<String>,

    /// One of [`CARDS_PER_PAGE`]
    pub cards_per_page: Option<i32>,

    #[validate(length(min = 1, max = 255, message = "The default collection must be between 1 and 255 characters"))]
    pub default_collection: Option<String>,

    pub email_notifications: Option<bool>,
    pub tool_updates: Option<bool>,
    pub workshop_reminders: Option<bool>,
    pub weekly_digest: Option<bool>,
    pub public_collections: Option<bool>,
    pub public_profile: Option<bool>,
    pub share_tool_history: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Checks the enumerated fields against their allowed values
    fn check_choices(&self) -> ApiResult<()> {
        let mut details = Vec::new();

        if let Some(view_mode) = &self.view_mode {
            if !VIEW_MODES.contains(&view_mode.as_str()) {
                details.push(ValidationErrorDetail {
                    field: "view_mode".to_string(),
                    message: "The view mode must be compact, comfortable or spacious".to_string(),
                });
            }
        }

        if let Some(cards_per_page) = self.cards_per_page {
            if !CARDS_PER_PAGE.contains(&cards_per_page) {
                details.push(ValidationErrorDetail {
                    field: "cards_per_page".to_string(),
                    message: "The cards per page must be 6, 12, 24 or 48".to_string(),
                });
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(details))
        }
    }
}

impl From<UpdateSettingsRequest> for UpdateSettings {
    fn from(req: UpdateSettingsRequest) -> Self {
        UpdateSettings {
            view_mode: req.view_mode,
            cards_per_page: req.cards_per_page,
            default_collection: req.default_collection,
            email_notifications: req.email_notifications,
            tool_updates: req.tool_updates,
            workshop_reminders: req.workshop_reminders,
            weekly_digest: req.weekly_digest,
            public_collections: req.public_collections,
            public_profile: req.public_profile,
            share_tool_history: req.share_tool_history,
        }
    }
}

pub async fn show(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserSettings>> {
    Ok(Json(UserSettings::get_or_create(&state.db, auth.user_id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> ApiResult<Json<UserSettings>> {
    let Json(req) = payload?;
    req.validate()?;
    req.check_choices()?;

    Ok(Json(
        UserSettings::update(&state.db, auth.user_id, req.into()).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_mode_enum() {
        let req = UpdateSettingsRequest {
            view_mode: Some("spacious".to_string()),
            ..Default::default()
        };
        assert!(req.check_choices().is_ok());

        let req = UpdateSettingsRequest {
            view_mode: Some("cozy".to_string()),
            ..Default::default()
        };
        match req.check_choices() {
            Err(ApiError::ValidationError(details)) => assert_eq!(details[0].field, "view_mode"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_cards_per_page_enum() {
        let req = UpdateSettingsRequest {
            cards_per_page: Some(24),
            ..Default::default()
        };
        assert!(req.check_choices().is_ok());

        let req = UpdateSettingsRequest {
            view_mode: Some("cozy".to_string()),
            cards_per_page: Some(10),
            ..Default::default()
        };
        match req.check_choices() {
            Err(ApiError::ValidationError(details)) => assert_eq!(details.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_body_is_valid() {
        let req: UpdateSettingsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.check_choices().is_ok());
    }
}
