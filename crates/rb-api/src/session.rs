//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie only carries the id of a server-side `LoginSession`.
//! `SessionContext` resolves that record and enforces the sliding idle
//! timeout; `CurrentUser` and `Viewer` resolve the logged-in account for
//! handlers.

use actix_session::{Session, SessionExt};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::Duration;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use rb_core::{AppError, LoginSession, Result, User, Uuid};

use crate::error::ApiError;
use crate::handlers::AppState;

pub(crate) const SESSION_ID_KEY: &str = "sid";
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: i64 = 30;

pub fn default_idle_timeout() -> Duration {
    Duration::minutes(DEFAULT_IDLE_TIMEOUT_MINUTES)
}

fn session_error(err: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("session storage failed: {err}"))
}

fn app_state(req: &HttpRequest) -> std::result::Result<web::Data<AppState>, ApiError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not configured".into()).into())
}

/// Per-request view of the session.
pub struct SessionContext {
    session: Session,
    state: web::Data<AppState>,
}

impl SessionContext {
    pub fn new(session: Session, state: web::Data<AppState>) -> Self {
        Self { session, state }
    }

    fn session_id(&self) -> Option<Uuid> {
        match self.session.get::<Uuid>(SESSION_ID_KEY) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("ignoring unreadable session id: {e}");
                None
            }
        }
    }

    /// Starts a server-side session for `user_id`. Any session the cookie
    /// already pointed at is deleted and the cookie is renewed, so a
    /// pre-login cookie cannot be reused.
    pub async fn persist_user(&self, user_id: Uuid) -> Result<()> {
        self.end_stored_session().await?;
        let record = self
            .state
            .sessions
            .create_session(LoginSession::new(user_id))
            .await?;

        self.session.renew();
        self.session
            .insert(SESSION_ID_KEY, record.id)
            .map_err(session_error)
    }

    /// The logged-in user id, if the cookie names a live session that has
    /// not been idle for longer than the timeout. Reading it counts as
    /// activity.
    pub async fn user_id(&self) -> Result<Option<Uuid>> {
        let Some(id) = self.session_id() else {
            return Ok(None);
        };
        let Some(mut record) = self.state.sessions.find_session(id).await? else {
            log::info!("session {id} no longer exists");
            self.session.purge();
            return Ok(None);
        };

        if record.is_idle(self.state.idle_timeout) {
            log::info!("session for user {} expired", record.user_id);
            self.state.sessions.delete_session(id).await?;
            self.session.purge();
            return Ok(None);
        }

        record.touch();
        if self.state.sessions.touch_session(&record).await? {
            Ok(Some(record.user_id))
        } else {
            // Ended by a concurrent logout.
            self.session.purge();
            Ok(None)
        }
    }

    /// Require an authenticated user id or fail with `Unauthorized`.
    pub async fn require_user_id(&self) -> Result<Uuid> {
        self.user_id()
            .await?
            .ok_or_else(|| AppError::Unauthorized("login required".into()))
    }

    /// Deletes the server-side session and the cookie.
    pub async fn clear(&self) -> Result<()> {
        self.end_stored_session().await?;
        self.session.purge();
        Ok(())
    }

    async fn end_stored_session(&self) -> Result<()> {
        if let Some(id) = self.session_id() {
            self.state.sessions.delete_session(id).await?;
        }
        Ok(())
    }

    /// Loads the account behind the session. A session whose user has been
    /// removed is cleared.
    async fn resolve_user(&self) -> Result<Option<User>> {
        let Some(user_id) = self.user_id().await? else {
            return Ok(None);
        };
        match self.state.users.find_by_id(user_id).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::NotFound(..)) => {
                log::warn!("session refers to missing user {user_id}");
                self.clear().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl FromRequest for SessionContext {
    type Error = ApiError;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(app_state(req).map(|state| Self::new(req.get_session(), state)))
    }
}

/// The authenticated account behind the current request.
///
/// Extracting it redirects anonymous visitors to `/login` before the
/// handler body runs.
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = app_state(req).map(|state| SessionContext::new(req.get_session(), state));

        Box::pin(async move {
            match context?.resolve_user().await? {
                Some(user) => Ok(CurrentUser(user)),
                None => Err(AppError::Unauthorized("login required".into()).into()),
            }
        })
    }
}

/// The visitor on a public page: logged in or not.
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.username.as_str())
    }
}

impl FromRequest for Viewer {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, std::result::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = app_state(req).map(|state| SessionContext::new(req.get_session(), state));

        Box::pin(async move { Ok(Viewer(context?.resolve_user().await?)) })
    }
}
