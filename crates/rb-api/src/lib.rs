//! # rb-api
//!
//! The web routing and orchestration layer for Rusty-Blog.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod session;

pub use error::{ApiError, ApiResult};
pub use handlers::AppState;

use actix_web::web;
use handlers::{ads, auth, posts};

/// Configures the routes for the blog and the ads board.
///
/// # Developer Note
/// The `/create` resources are registered before `/{id}` so that the
/// literal segment wins over the id pattern.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .route("/logout", web::post().to(auth::logout))
        .service(
            web::resource("/register")
                .route(web::get().to(auth::register_form))
                .route(web::post().to(auth::register)),
        )
        .service(
            web::scope("/posts")
                .route("", web::get().to(posts::index))
                .service(
                    web::resource("/create")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create)),
                )
                .route("/{id}", web::get().to(posts::show))
                .route("/{id}/delete", web::post().to(posts::delete)),
        )
        .service(
            web::scope("/ads")
                .route("", web::get().to(ads::index))
                .service(
                    web::resource("/create")
                        .route(web::get().to(ads::create_form))
                        .route(web::post().to(ads::create)),
                )
                .route("/{id}", web::get().to(ads::show))
                .service(
                    web::resource("/{id}/edit")
                        .route(web::get().to(ads::edit_form))
                        .route(web::post().to(ads::update)),
                )
                .route("/{id}/delete", web::post().to(ads::delete)),
        );
}
