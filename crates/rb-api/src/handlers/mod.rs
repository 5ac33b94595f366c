//! # rb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

pub mod ads;
pub mod auth;
pub mod posts;

use std::sync::Arc;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use askama::Template;
use chrono::Duration;
use rb_core::traits::{AdRepo, AuthProvider, PostRepo, SessionRepo, UserRepo};
use rb_core::AppError;

use crate::error::ApiResult;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub ads: Arc<dyn AdRepo>,
    pub sessions: Arc<dyn SessionRepo>,
    pub auth: Arc<dyn AuthProvider>,
    /// Sessions idle for longer than this are treated as logged out.
    pub idle_timeout: Duration,
}

impl AppState {
    /// Wires one storage plugin that serves every entity type.
    pub fn new<R>(repo: Arc<R>, auth: Arc<dyn AuthProvider>, idle_timeout: Duration) -> Self
    where
        R: UserRepo + PostRepo + AdRepo + SessionRepo + 'static,
    {
        Self {
            users: repo.clone(),
            posts: repo.clone(),
            ads: repo.clone(),
            sessions: repo,
            auth,
            idle_timeout,
        }
    }

    /// Display name for an owner/author id.
    pub(crate) async fn username_of(&self, user_id: rb_core::Uuid) -> ApiResult<String> {
        Ok(self.users.find_by_id(user_id).await?.username)
    }
}

/// `GET /`
pub async fn index() -> HttpResponse {
    redirect("/ads")
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

pub(crate) fn render<T: Template>(status: StatusCode, template: &T) -> ApiResult<HttpResponse> {
    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("template rendering failed: {e}")))?;
    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(html))
}

/// Failures the visitor can fix by resubmitting the form. These are shown
/// on the form itself instead of an error page.
pub(crate) fn form_status(err: &AppError) -> Option<StatusCode> {
    match err {
        AppError::ValidationError(_) => Some(StatusCode::BAD_REQUEST),
        AppError::Conflict(_) => Some(StatusCode::CONFLICT),
        _ => None,
    }
}
