use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::require_db;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::ValidatedJson;
use crate::repos::user_settings::{self, MealCategory, Theme, UpdateUserSettings, UserSettings};
use crate::repos::users::User;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub settings: UserSettings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub enabled_meal_categories: Option<Vec<String>>,
}

impl UpdateSettingsRequest {
    fn validate(self) -> Result<UpdateUserSettings, AppError> {
        if self.theme.is_none() && self.enabled_meal_categories.is_none() {
            return Err(AppError::invalid(
                "VALIDATION_ERROR",
                "At least one setting must be provided",
            ));
        }

        let theme = self
            .theme
            .map(|raw| {
                Theme::parse(&raw).ok_or_else(|| {
                    AppError::invalid("INVALID_THEME", format!("Unknown theme '{raw}'"))
                })
            })
            .transpose()?;

        let enabled_meal_categories = self
            .enabled_meal_categories
            .map(|names| {
                names
                    .iter()
                    .map(|name| {
                        MealCategory::parse(name).ok_or_else(|| {
                            AppError::invalid(
                                "INVALID_MEAL_CATEGORY",
                                format!("Unknown meal category '{name}'"),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(UpdateUserSettings {
            theme,
            enabled_meal_categories,
        })
    }
}

async fn get_profile(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let CurrentUser(user) = current_user;
    let settings = user_settings::get_settings(db, user.id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse { user, settings }))
}

async fn update_settings(
    current_user: CurrentUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<UpdateSettingsRequest>,
) -> Result<HttpResponse, AppError> {
    let update = body.into_inner().validate()?;
    let db = require_db(&app_state)?;

    let settings = user_settings::upsert_settings(db, current_user.id(), update).await?;
    tracing::info!(
        user_id = current_user.id(),
        theme = settings.theme.as_str(),
        "user_settings.updated"
    );

    Ok(HttpResponse::Ok().json(settings))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(get_profile))
        .route("/settings", web::put().to(update_settings));
}
