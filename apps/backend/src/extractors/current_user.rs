use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use tracing::debug;

use super::auth_token::AuthToken;
use crate::auth::jwt::verify_token;
use crate::db::require_db;
use crate::error::AppError;
use crate::middleware::AuthenticatedUserId;
use crate::repos::users::{self, User};
use crate::state::app_state::AppState;

/// The authenticated caller, loaded from `users`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        // The body belongs to the handler's body extractor; only headers are read here.
        Box::pin(async move {
            let token = AuthToken::parse(&req)?;

            let app_state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::internal("AppState not available"))?;

            let subject =
                verify_token(&token.token, &app_state.security).ok_or(AppError::UnauthorizedInvalidToken)?;

            let db = require_db(app_state)?;
            let user = users::find_user_by_id(db, subject.user_id)
                .await?
                .ok_or(AppError::ForbiddenUserNotFound)?;

            debug!(user_id = user.id, "authenticated");
            req.extensions_mut().insert(AuthenticatedUserId(user.id));
            Ok(CurrentUser(user))
        })
    }
}

/// A `CurrentUser` whose role is admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let current = CurrentUser::from_request(req, payload);

        Box::pin(async move {
            let CurrentUser(user) = current.await?;
            if !user.is_admin() {
                return Err(AppError::forbidden(
                    "FORBIDDEN_ADMIN_ONLY",
                    "Admin role required",
                ));
            }
            Ok(AdminUser(user))
        })
    }
}
