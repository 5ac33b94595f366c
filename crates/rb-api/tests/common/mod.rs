//! Shared fixtures for the HTTP tests: an in-memory database, a cheap
//! password hasher and the fully wired application.
#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use rb_api::middleware::{security_headers, session_middleware, SESSION_COOKIE};
use rb_api::session::default_idle_timeout;
use rb_api::{configure_routes, AppState};
use rb_auth_simple::SimpleAuthProvider;
use rb_core::traits::{AuthProvider, Repository};
use rb_core::User;
use rb_db_sqlite::SqliteRepo;

pub struct TestContext {
    pub repo: Arc<SqliteRepo>,
    pub auth: Arc<SimpleAuthProvider>,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_idle_timeout(default_idle_timeout()).await
    }

    pub async fn with_idle_timeout(idle_timeout: chrono::Duration) -> Self {
        let repo = Arc::new(SqliteRepo::new("sqlite::memory:").await.unwrap());
        let auth = Arc::new(SimpleAuthProvider::with_cost(8, 1, 1).unwrap());
        let state = web::Data::new(AppState::new(repo.clone(), auth.clone(), idle_timeout));
        Self { repo, auth, state }
    }

    pub async fn create_user(&self, username: &str, password: &str) -> User {
        let hash = self.auth.hash_password(password).unwrap();
        let user = User::new(username.to_string(), hash, None);
        Repository::<User>::save(self.repo.as_ref(), user).await.unwrap()
    }

    pub async fn app(
        &self,
    ) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(session_middleware(Key::generate(), false, default_idle_timeout()))
                .wrap(security_headers())
                .configure(configure_routes),
        )
        .await
    }
}

/// The session cookie set by `resp`, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Logs in through `POST /login` and returns the session cookie.
pub async fn login<S, B>(app: &S, username: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", username), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 303, "login as {username} failed");
    session_cookie(&resp).expect("login sets a session cookie")
}

pub async fn body_string<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}
