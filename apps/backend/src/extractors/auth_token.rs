use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;

/// Raw bearer token from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: String,
}

impl AuthToken {
    pub(crate) fn parse(req: &HttpRequest) -> Result<Self, AppError> {
        let value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::UnauthorizedMissingBearer)?;

        let mut parts = value.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some("Bearer"), Some(token), None) => Ok(AuthToken {
                token: token.to_string(),
            }),
            _ => Err(AppError::UnauthorizedMissingBearer),
        }
    }
}

impl FromRequest for AuthToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::parse(req))
    }
}
