//! rusty-blog/crates/rb-api/src/middleware.rs Middleware
//!
//! Custom middleware for security, logging, and sessions.

use actix_session::config::{PersistentSession, TtlExtensionPolicy};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{time, Key, SameSite};
use actix_web::middleware::{DefaultHeaders, Logger};

pub const SESSION_COOKIE: &str = "session";

// Returns a standard set of middleware for the Rusty-Blog API.
pub fn standard_middleware() -> Logger {
    // We use the 'default' logger which outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

/// Headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("X-Frame-Options", "DENY"))
}

/// Encrypted cookie session whose lifetime slides forward on every request.
///
/// The cookie TTL only bounds what the browser keeps; the idle timeout is
/// enforced server-side by `SessionContext`.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
    idle_timeout: chrono::Duration,
) -> SessionMiddleware<CookieSessionStore> {
    let lifecycle = PersistentSession::default()
        .session_ttl(time::Duration::seconds(idle_timeout.num_seconds()))
        .session_ttl_extension_policy(TtlExtensionPolicy::OnEveryRequest);

    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(lifecycle)
        .build()
}
