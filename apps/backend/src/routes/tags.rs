use actix_web::{web, HttpResponse};
use lazy_regex::regex_is_match;
use serde::Deserialize;

use crate::db::require_db;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::extractors::ValidatedJson;
use crate::repos::tags;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

impl CreateTagRequest {
    fn validate(self) -> Result<(String, String), AppError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::invalid("INVALID_TAG_NAME", "Tag name must not be empty"));
        }
        if !regex_is_match!(r"^#[0-9A-Fa-f]{6}$", &self.color) {
            return Err(AppError::invalid(
                "INVALID_COLOR",
                format!("Color must look like #RRGGBB, got '{}'", self.color),
            ));
        }
        Ok((name, self.color))
    }
}

async fn list_tags(
    _current_user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(tags::list_tags(db).await?))
}

async fn create_tag(
    _current_user: CurrentUser,
    app_state: web::Data<AppState>,
    body: ValidatedJson<CreateTagRequest>,
) -> Result<HttpResponse, AppError> {
    let (name, color) = body.into_inner().validate()?;
    let db = require_db(&app_state)?;

    let tag = tags::create_tag(db, &name, &color).await?;
    Ok(HttpResponse::Created().json(tag))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_tags))
        .route("", web::post().to(create_tag));
}
