//! # Rusty-Blog Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::cookie::Key;
use actix_web::{web, App, HttpServer};
use rb_api::middleware::{security_headers, session_middleware, standard_middleware};
use rb_api::{configure_routes, AppState};
use rb_config::Settings;
use secrecy::ExposeSecret;

// Feature-gated imports: This is the "Compiled-to-Order" magic
#[cfg(feature = "db-sqlite")]
use rb_db_sqlite::SqliteRepo;

#[cfg(feature = "auth-simple")]
use rb_auth_simple::SimpleAuthProvider;

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("rusty-blog needs a storage plugin (db-sqlite) and an auth plugin (auth-simple)");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::load()?;

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = Arc::new(
        SqliteRepo::connect(&settings.database.url, settings.database.max_connections).await?,
    );

    // 2. Initialize Auth Implementation
    #[cfg(feature = "auth-simple")]
    let auth = Arc::new(SimpleAuthProvider::new()?);

    // 3. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let idle_timeout = chrono::Duration::minutes(settings.session.idle_timeout_minutes.into());
    let state = web::Data::new(AppState::new(repo, auth, idle_timeout));

    let key = match &settings.session.key {
        Some(secret) => Key::derive_from(secret.expose_secret().as_bytes()),
        None => {
            log::warn!("session.key is not set; using an ephemeral key, sessions end on restart");
            Key::generate()
        }
    };
    let cookie_secure = settings.session.cookie_secure;
    let (host, port) = settings.bind_address();

    log::info!("🚀 Rusty-Blog starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(session_middleware(key.clone(), cookie_secure, idle_timeout))
            .wrap(security_headers())
            .wrap(standard_middleware())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
