use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use db_infra::DbInfraError;
use serde::Serialize;
use thiserror::Error;

use crate::trace_ctx;

/// RFC 7807 body returned for every error response.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: &'static str, detail: String },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: &'static str, detail: String },
    #[error("Missing or malformed Bearer token")]
    UnauthorizedMissingBearer,
    #[error("Invalid token")]
    UnauthorizedInvalidToken,
    #[error("Forbidden: {detail}")]
    Forbidden { code: &'static str, detail: String },
    #[error("Forbidden: User not found")]
    ForbiddenUserNotFound,
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Database unavailable")]
    DbUnavailable,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Forbidden { code, .. } => *code,
            AppError::Db { .. } => "DB_ERROR",
            AppError::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            AppError::UnauthorizedInvalidToken => "UNAUTHORIZED_INVALID_TOKEN",
            AppError::ForbiddenUserNotFound => "FORBIDDEN_USER_NOT_FOUND",
            AppError::Internal { .. } => "INTERNAL",
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::DbUnavailable => "DB_UNAVAILABLE",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::Db { detail }
            | AppError::NotFound { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::Internal { detail }
            | AppError::Config { detail } => detail.clone(),
            AppError::UnauthorizedMissingBearer => "Missing or malformed Bearer token".to_string(),
            AppError::UnauthorizedInvalidToken => "Token could not be verified".to_string(),
            AppError::ForbiddenUserNotFound => "User not found in database".to_string(),
            AppError::DbUnavailable => "No database is configured for this environment".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Db { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UnauthorizedMissingBearer | AppError::UnauthorizedInvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden { .. } | AppError::ForbiddenUserNotFound => StatusCode::FORBIDDEN,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn invalid(code: &'static str, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: &'static str, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn forbidden(code: &'static str, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::db(e.to_string())
    }
}

impl From<DbInfraError> for AppError {
    fn from(e: DbInfraError) -> Self {
        match e {
            DbInfraError::MissingDatabaseUrl | DbInfraError::Config { .. } => {
                AppError::config(e.to_string())
            }
            DbInfraError::Connect { .. } | DbInfraError::Migration { .. } => {
                AppError::db(e.to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://meals.app/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(AppError::DbUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::UnauthorizedMissingBearer.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden("FORBIDDEN_ADMIN_ONLY", "x").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::invalid("INVALID_COLOR", "x").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_humanize_code() {
        assert_eq!(AppError::humanize_code("DB_UNAVAILABLE"), "Db Unavailable");
        assert_eq!(AppError::humanize_code("INVALID_COLOR"), "Invalid Color");
    }

    #[test]
    fn test_missing_database_url_is_config_error() {
        let err = AppError::from(DbInfraError::MissingDatabaseUrl);
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[actix_web::test]
    async fn test_error_response_is_problem_json() {
        let resp = crate::trace_ctx::with_trace_id("trace-abc".to_string(), async {
            AppError::DbUnavailable.error_response()
        })
        .await;

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            resp.headers().get("content-type").unwrap().to_str().unwrap(),
            "application/problem+json"
        );
        assert_eq!(
            resp.headers().get("x-trace-id").unwrap().to_str().unwrap(),
            "trace-abc"
        );
    }
}
