//! Login, logout and registration.
//!
//! ```text
//! POST /login     username=testUser&password=pass
//! POST /logout
//! POST /register  username=testUser&email=testUser@example.com&password=pass
//! ```

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use rb_core::forms::{LoginForm, RegisterForm};
use rb_core::traits::{AuthProvider, UserRepo};
use rb_core::{AppError, Result, User};
use rb_ui::{LoginTemplate, RegisterTemplate};

use super::{form_status, redirect, render, AppState};
use crate::error::ApiResult;
use crate::session::{SessionContext, Viewer};

/// Checks a username/password pair.
///
/// An unknown username still pays for one password verification and
/// yields the same `InvalidCredentials` as a wrong password.
pub async fn authenticate(
    users: &dyn UserRepo,
    auth: &dyn AuthProvider,
    username: &str,
    password: &str,
) -> Result<User> {
    let user = users.find_by_username(username.trim()).await?;
    let hash = user.as_ref().map(|u| u.password.as_str());

    if auth.verify_password(password, hash).await {
        user.ok_or(AppError::InvalidCredentials)
    } else {
        Err(AppError::InvalidCredentials)
    }
}

/// `GET /login`
pub async fn login_form(viewer: Viewer) -> ApiResult<HttpResponse> {
    render(
        StatusCode::OK,
        &LoginTemplate {
            title: "Log in",
            current_user: viewer.username(),
            username: "",
            error: None,
        },
    )
}

/// `POST /login`
pub async fn login(
    state: web::Data<AppState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    match authenticate(state.users.as_ref(), state.auth.as_ref(), &form.username, &form.password).await {
        Ok(user) => {
            session.persist_user(user.id).await?;
            log::info!("user {} logged in", user.username);
            Ok(redirect("/ads"))
        }
        Err(AppError::InvalidCredentials) => {
            log::warn!("failed login attempt for {:?}", form.username);
            render(
                StatusCode::UNAUTHORIZED,
                &LoginTemplate {
                    title: "Log in",
                    current_user: None,
                    username: &form.username,
                    error: Some("Invalid username or password"),
                },
            )
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /logout`
///
/// Deletes the server-side session, so copies of the old cookie stop
/// working too.
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear().await?;
    Ok(redirect("/login"))
}

/// `GET /register`
pub async fn register_form(viewer: Viewer) -> ApiResult<HttpResponse> {
    render(
        StatusCode::OK,
        &RegisterTemplate {
            title: "Register",
            current_user: viewer.username(),
            username: "",
            email: "",
            error: None,
        },
    )
}

async fn create_account(state: &AppState, form: &RegisterForm) -> Result<User> {
    // Validate before paying for the hash.
    let (username, email) = form.validate()?;
    let hash = state.auth.hash_password(&form.password)?;
    state.users.save(User::new(username, hash, email)).await
}

/// `POST /register`
pub async fn register(
    state: web::Data<AppState>,
    viewer: Viewer,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    match create_account(&state, &form).await {
        Ok(user) => {
            log::info!("registered user {} ({})", user.username, user.id);
            Ok(redirect("/login"))
        }
        Err(err) => match form_status(&err) {
            Some(status) => render(
                status,
                &RegisterTemplate {
                    title: "Register",
                    current_user: viewer.username(),
                    username: &form.username,
                    email: &form.email,
                    error: Some(&err.to_string()),
                },
            ),
            None => Err(err.into()),
        },
    }
}

