//! Classified ads: public listing and detail pages, owner-only changes.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use rb_core::forms::AdForm;
use rb_core::{Ad, AppError, Result, User, Uuid};
use rb_ui::{AdFormTemplate, AdIndexTemplate, AdShowTemplate};

use super::{form_status, redirect, render, AppState};
use crate::error::ApiResult;
use crate::session::{CurrentUser, Viewer};

const CREATE_ACTION: &str = "/ads/create";

fn edit_action(id: Uuid) -> String {
    format!("/ads/{id}/edit")
}

/// `GET /ads`
pub async fn index(state: web::Data<AppState>, viewer: Viewer) -> ApiResult<HttpResponse> {
    let ads = state.ads.find_all().await?;
    render(
        StatusCode::OK,
        &AdIndexTemplate {
            title: "Ads",
            current_user: viewer.username(),
            ads: &ads,
        },
    )
}

/// `GET /ads/{id}`
pub async fn show(
    state: web::Data<AppState>,
    viewer: Viewer,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let ad = state.ads.find_by_id(path.into_inner()).await?;
    let owner = state.username_of(ad.owner_id).await?;
    render(
        StatusCode::OK,
        &AdShowTemplate {
            title: &ad.title,
            current_user: viewer.username(),
            ad: &ad,
            owner: &owner,
        },
    )
}

fn form_page(
    status: StatusCode,
    user: &User,
    title: &str,
    action: &str,
    form: &AdForm,
    error: Option<&str>,
) -> ApiResult<HttpResponse> {
    render(
        status,
        &AdFormTemplate {
            title,
            current_user: Some(&user.username),
            action,
            ad_title: &form.title,
            description: &form.description,
            error,
        },
    )
}

fn ensure_owner(ad: &Ad, user: &User) -> Result<()> {
    if ad.is_owned_by(user.id) {
        Ok(())
    } else {
        log::warn!("user {} denied access to ad {}", user.username, ad.id);
        Err(AppError::Forbidden("only the owner can change this ad".into()))
    }
}

/// `GET /ads/create`
pub async fn create_form(CurrentUser(user): CurrentUser) -> ApiResult<HttpResponse> {
    form_page(StatusCode::OK, &user, "New ad", CREATE_ACTION, &AdForm::default(), None)
}

/// `POST /ads/create`
pub async fn create(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    form: web::Form<AdForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let saved = match form.clone().into_ad(user.id) {
        Ok(ad) => state.ads.save(ad).await,
        Err(e) => Err(e),
    };

    match saved {
        Ok(ad) => {
            log::info!("user {} created ad {}", user.username, ad.id);
            Ok(redirect("/ads"))
        }
        Err(err) => match form_status(&err) {
            Some(status) => form_page(
                status,
                &user,
                "New ad",
                CREATE_ACTION,
                &form,
                Some(&err.to_string()),
            ),
            None => Err(err.into()),
        },
    }
}

/// `GET /ads/{id}/edit`
pub async fn edit_form(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let ad = state.ads.find_by_id(path.into_inner()).await?;
    ensure_owner(&ad, &user)?;
    form_page(
        StatusCode::OK,
        &user,
        "Edit ad",
        &edit_action(ad.id),
        &AdForm::from_ad(&ad),
        None,
    )
}

/// `POST /ads/{id}/edit`
///
/// Re-reads the stored ad so only title and description can change.
pub async fn update(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    form: web::Form<AdForm>,
) -> ApiResult<HttpResponse> {
    let mut ad = state.ads.find_by_id(path.into_inner()).await?;
    ensure_owner(&ad, &user)?;

    let id = ad.id;
    let form = form.into_inner();
    let saved = match form.clone().apply_to(&mut ad) {
        Ok(()) => state.ads.save(ad).await,
        Err(e) => Err(e),
    };

    match saved {
        Ok(ad) => {
            log::info!("user {} updated ad {}", user.username, ad.id);
            Ok(redirect(&format!("/ads/{}", ad.id)))
        }
        Err(err) => match form_status(&err) {
            Some(status) => form_page(
                status,
                &user,
                "Edit ad",
                &edit_action(id),
                &form,
                Some(&err.to_string()),
            ),
            None => Err(err.into()),
        },
    }
}

/// `POST /ads/{id}/delete`
pub async fn delete(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let ad = state.ads.find_by_id(path.into_inner()).await?;
    ensure_owner(&ad, &user)?;

    state.ads.delete_by_id(ad.id).await?;
    log::info!("user {} deleted ad {}", user.username, ad.id);
    Ok(redirect("/ads"))
}
