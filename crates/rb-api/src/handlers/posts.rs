//! Blog posts. Reading is public; writing and deleting need a session.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use rb_core::forms::PostForm;
use rb_core::{AppError, Post, Result, User, Uuid};
use rb_ui::{PostFormTemplate, PostIndexTemplate, PostShowTemplate};

use super::{form_status, redirect, render, AppState};
use crate::error::ApiResult;
use crate::session::{CurrentUser, Viewer};

/// `GET /posts`
pub async fn index(state: web::Data<AppState>, viewer: Viewer) -> ApiResult<HttpResponse> {
    let posts = state.posts.find_all().await?;
    render(
        StatusCode::OK,
        &PostIndexTemplate {
            title: "Posts",
            current_user: viewer.username(),
            posts: &posts,
        },
    )
}

/// `GET /posts/{id}`
pub async fn show(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = state.posts.find_by_id(path.into_inner()).await?;
    let author = state.username_of(post.author_id).await?;
    render(
        StatusCode::OK,
        &PostShowTemplate {
            title: &post.title,
            current_user: viewer.username(),
            post: &post,
            author: &author,
        },
    )
}

fn form_page(
    status: StatusCode,
    user: &User,
    form: &PostForm,
    error: Option<&str>,
) -> ApiResult<HttpResponse> {
    render(
        status,
        &PostFormTemplate {
            title: "Write a post",
            current_user: Some(&user.username),
            post_title: &form.title,
            body: &form.body,
            error,
        },
    )
}

/// `GET /posts/create`
pub async fn create_form(CurrentUser(user): CurrentUser) -> ApiResult<HttpResponse> {
    form_page(StatusCode::OK, &user, &PostForm::default(), None)
}

/// `POST /posts/create`
///
/// The author is always the logged-in user.
pub async fn create(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    form: web::Form<PostForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let saved = match form.clone().into_post(user.id) {
        Ok(post) => state.posts.save(post).await,
        Err(e) => Err(e),
    };

    match saved {
        Ok(post) => {
            log::info!("user {} created post {}", user.username, post.id);
            Ok(redirect("/posts"))
        }
        Err(err) => match form_status(&err) {
            Some(status) => form_page(status, &user, &form, Some(&err.to_string())),
            None => Err(err.into()),
        },
    }
}

fn ensure_author(post: &Post, user: &User) -> Result<()> {
    if post.is_authored_by(user.id) {
        Ok(())
    } else {
        log::warn!("user {} denied access to post {}", user.username, post.id);
        Err(AppError::Forbidden("only the author can change this post".into()))
    }
}

/// `POST /posts/{id}/delete`
pub async fn delete(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let post = state.posts.find_by_id(path.into_inner()).await?;
    ensure_author(&post, &user)?;

    state.posts.delete_by_id(post.id).await?;
    log::info!("user {} deleted post {}", user.username, post.id);
    Ok(redirect("/posts"))
}
