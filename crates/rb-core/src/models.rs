//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Blog.
//! We use UUID v7 for time-ordered, globally unique identification,
//! assigned when the entity is constructed and never changed afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// An account that can log in and own posts and ads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string, never the plaintext password
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password: password_hash.into(),
            email,
            created_at: Utc::now(),
        }
    }
}

/// A blog post written by a single author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn new(title: impl Into<String>, body: impl Into<String>, author_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            body: body.into(),
            author_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A classified ad. Titles are unique so an ad can be looked up by title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Ad {
    pub fn new(title: impl Into<String>, description: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: description.into(),
            owner_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Server-side record of a login. The browser only carries its id, so
/// deleting the row ends the session no matter which cookie copy is replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            created_at: now,
            last_seen: now,
        }
    }

    /// Whether the session has gone unused for at least `idle_timeout`.
    pub fn is_idle(&self, idle_timeout: chrono::Duration) -> bool {
        Utc::now() - self.last_seen >= idle_timeout
    }

    /// Records activity.
    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }
}
