//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::error::Result;
use crate::models::{Ad, LoginSession, Post, User};
use uuid::Uuid;

/// CRUD contract shared by every entity type.
///
/// Implemented once per entity (`Repository<User>`, `Repository<Post>`,
/// `Repository<Ad>`) rather than through a single generic mechanism.
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// All rows, oldest first.
    async fn find_all(&self) -> Result<Vec<T>>;

    /// Fails with `AppError::NotFound` when the id does not exist.
    async fn find_by_id(&self, id: Uuid) -> Result<T>;

    /// Inserts when the id is new, otherwise updates the mutable columns.
    async fn save(&self, entity: T) -> Result<T>;

    /// Returns whether a row was removed. A missing id is a no-op.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait UserRepo: Repository<User> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

pub trait PostRepo: Repository<Post> {}

#[async_trait]
pub trait AdRepo: Repository<Ad> {
    async fn find_by_title(&self, title: &str) -> Result<Option<Ad>>;
}

/// Server-side login sessions.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn create_session(&self, session: LoginSession) -> Result<LoginSession>;

    async fn find_session(&self, id: Uuid) -> Result<Option<LoginSession>>;

    /// Stores `session.last_seen`. Returns false when the session is gone;
    /// a deleted session is never brought back.
    async fn touch_session(&self, session: &LoginSession) -> Result<bool>;

    /// Returns whether a session was removed.
    async fn delete_session(&self, id: Uuid) -> Result<bool>;
}

/// Password hashing contract.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Produces a salted, one-way hash suitable for `User::password`.
    fn hash_password(&self, password: &str) -> Result<String>;

    /// Verifies a password against a stored hash.
    ///
    /// With `None` the comparison runs against a decoy hash and always
    /// fails, so an unknown username costs as much as a wrong password.
    async fn verify_password(&self, password: &str, hash: Option<&str>) -> bool;
}
