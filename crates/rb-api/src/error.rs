//! HTTP mapping for `AppError`.
//!
//! Handlers return `ApiResult<T>`; every domain failure becomes a status
//! code and a rendered error page, and internal details are only logged.

use std::fmt;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use rb_core::AppError;
use rb_ui::ErrorTemplate;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Newtype so the actix trait can be implemented for the core error.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::SEE_OTHER,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.0 {
            // Anonymous visitors are sent to the login page.
            AppError::Unauthorized(_) => {
                return HttpResponse::SeeOther()
                    .insert_header(("Location", "/login"))
                    .finish();
            }
            AppError::Internal(detail) => {
                log::error!("request failed: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let status = self.status_code();
        let page = ErrorTemplate {
            title: status.canonical_reason().unwrap_or("Error"),
            current_user: None,
            status: status.as_u16(),
            message: &message,
        };
        match page.render() {
            Ok(html) => HttpResponse::build(status)
                .content_type(ContentType::html())
                .body(html),
            Err(e) => {
                log::error!("failed to render error page: {e}");
                HttpResponse::build(status).body(message)
            }
        }
    }
}
