use actix_web::{web, HttpResponse};

use crate::db::require_db;
use crate::error::AppError;
use crate::extractors::current_user::AdminUser;
use crate::repos::users;
use crate::state::app_state::AppState;

/// Every user with their role; admins only.
async fn list_users(
    _admin: AdminUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    Ok(HttpResponse::Ok().json(users::list_users(db).await?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::get().to(list_users));
}
