//! # rb-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `rb-core` domain models. One `SqliteRepo` serves every entity type;
//! each entity gets its own `Repository<T>` impl.

mod schema;

use std::str::FromStr;

use async_trait::async_trait;
use rb_core::error::{AppError, Result};
use rb_core::models::{Ad, LoginSession, Post, User};
use rb_core::traits::{AdRepo, PostRepo, Repository, SessionRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Connects with the default pool size and makes sure the schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, DEFAULT_MAX_CONNECTIONS).await
    }

    /// # Developer Note
    /// Every connection to `sqlite::memory:` opens its own private database,
    /// so in-memory pools are pinned to a single connection that is never
    /// recycled.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_with(options)
                .await?
        };

        schema::create(&pool).await?;
        log::info!("SQLite repository ready ({url})");
        Ok(Self { pool })
    }
}

/// Keeps storage details out of the domain: unique violations become
/// `Conflict`, everything unexpected becomes a logged `Internal`.
fn db_error(err: sqlx::Error, conflict: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::Conflict(conflict.to_string());
        }
        if db.is_foreign_key_violation() {
            return AppError::Conflict("referenced or referencing rows exist".to_string());
        }
    }
    log::error!("database error: {err}");
    AppError::Internal(err.to_string())
}

fn row_error(err: sqlx::Error) -> AppError {
    log::error!("failed to decode row: {err}");
    AppError::Internal(err.to_string())
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(row_error)?,
        username: row.try_get("username").map_err(row_error)?,
        password: row.try_get("password").map_err(row_error)?,
        email: row.try_get("email").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
    })
}

fn post_from_row(row: &SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.try_get("id").map_err(row_error)?,
        title: row.try_get("title").map_err(row_error)?,
        body: row.try_get("body").map_err(row_error)?,
        author_id: row.try_get("author_id").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
    })
}

fn ad_from_row(row: &SqliteRow) -> Result<Ad> {
    Ok(Ad {
        id: row.try_get("id").map_err(row_error)?,
        title: row.try_get("title").map_err(row_error)?,
        description: row.try_get("description").map_err(row_error)?,
        owner_id: row.try_get("owner_id").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
    })
}

fn session_from_row(row: &SqliteRow) -> Result<LoginSession> {
    Ok(LoginSession {
        id: row.try_get("id").map_err(row_error)?,
        user_id: row.try_get("user_id").map_err(row_error)?,
        created_at: row.try_get("created_at").map_err(row_error)?,
        last_seen: row.try_get("last_seen").map_err(row_error)?,
    })
}

#[async_trait]
impl Repository<User> for SqliteRepo {
    async fn find_all(&self) -> Result<Vec<User>> {
        sqlx::query("SELECT * FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(e, "user"))?
            .iter()
            .map(user_from_row)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "user"))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(AppError::not_found("User", id)),
        }
    }

    async fn save(&self, user: User) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (id, username, password, email, created_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET username = excluded.username, \
             password = excluded.password, email = excluded.email \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.email)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error(e, "username is already taken"))?;

        user_from_row(&row)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "user"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepo for SqliteRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "user"))?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }
}

#[async_trait]
impl Repository<Post> for SqliteRepo {
    async fn find_all(&self) -> Result<Vec<Post>> {
        sqlx::query("SELECT * FROM posts ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(e, "post"))?
            .iter()
            .map(post_from_row)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Post> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "post"))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(AppError::not_found("Post", id)),
        }
    }

    async fn save(&self, post: Post) -> Result<Post> {
        let row = sqlx::query(
            "INSERT INTO posts (id, title, body, author_id, created_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, body = excluded.body \
             RETURNING *",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.author_id)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error(e, "post already exists"))?;

        post_from_row(&row)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "post"))?;
        Ok(result.rows_affected() > 0)
    }
}

impl PostRepo for SqliteRepo {}

#[async_trait]
impl Repository<Ad> for SqliteRepo {
    async fn find_all(&self) -> Result<Vec<Ad>> {
        sqlx::query("SELECT * FROM ads ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(e, "ad"))?
            .iter()
            .map(ad_from_row)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Ad> {
        let row = sqlx::query("SELECT * FROM ads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "ad"))?;

        match row {
            Some(row) => ad_from_row(&row),
            None => Err(AppError::not_found("Ad", id)),
        }
    }

    /// Only title and description are updatable; owner and creation time
    /// keep their stored values.
    async fn save(&self, ad: Ad) -> Result<Ad> {
        let row = sqlx::query(
            "INSERT INTO ads (id, title, description, owner_id, created_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, description = excluded.description \
             RETURNING *",
        )
        .bind(ad.id)
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(ad.owner_id)
        .bind(ad.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error(e, "an ad with this title already exists"))?;

        ad_from_row(&row)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "ad"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AdRepo for SqliteRepo {
    async fn find_by_title(&self, title: &str) -> Result<Option<Ad>> {
        sqlx::query("SELECT * FROM ads WHERE title = ?")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "ad"))?
            .as_ref()
            .map(ad_from_row)
            .transpose()
    }
}

#[async_trait]
impl SessionRepo for SqliteRepo {
    async fn create_session(&self, session: LoginSession) -> Result<LoginSession> {
        let row = sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, last_seen) VALUES (?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.last_seen)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error(e, "session already exists"))?;

        session_from_row(&row)
    }

    async fn find_session(&self, id: Uuid) -> Result<Option<LoginSession>> {
        sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error(e, "session"))?
            .as_ref()
            .map(session_from_row)
            .transpose()
    }

    async fn touch_session(&self, session: &LoginSession) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET last_seen = ? WHERE id = ?")
            .bind(session.last_seen)
            .bind(session.id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "session"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error(e, "session"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo_with_user() -> (SqliteRepo, User) {
        let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
        let user = Repository::<User>::save(&repo, User::new("testUser", "hash", Some("testUser@example.com".into())))
            .await
            .unwrap();
        (repo, user)
    }

    async fn count_ads(repo: &SqliteRepo) -> usize {
        Repository::<Ad>::find_all(repo).await.unwrap().len()
    }

    #[tokio::test]
    async fn test_save_and_find_ad() {
        let (repo, user) = repo_with_user().await;

        let saved = Repository::<Ad>::save(&repo, Ad::new("Bike", "Red bike", user.id)).await.unwrap();
        let found = Repository::<Ad>::find_by_id(&repo, saved.id).await.unwrap();

        assert_eq!(found, saved);
        assert_eq!(repo.find_by_title("Bike").await.unwrap(), Some(saved));
        assert_eq!(repo.find_by_title("Car").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_existing_id_updates_only_editable_columns() {
        let (repo, user) = repo_with_user().await;
        let original = Repository::<Ad>::save(&repo, Ad::new("old", "old desc", user.id)).await.unwrap();

        let mut edited = original.clone();
        edited.title = "new".into();
        edited.description = "new desc".into();
        edited.owner_id = Uuid::now_v7();
        let updated = Repository::<Ad>::save(&repo, edited).await.unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.title, "new");
        assert_eq!(updated.description, "new desc");
        assert_eq!(updated.owner_id, user.id);
        assert_eq!(count_ads(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_find_missing_id_is_not_found() {
        let (repo, _) = repo_with_user().await;
        let missing = Uuid::now_v7();

        let err = Repository::<Post>::find_by_id(&repo, missing).await.unwrap_err();
        assert_eq!(err, AppError::not_found("Post", missing));
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_a_noop() {
        let (repo, user) = repo_with_user().await;
        Repository::<Ad>::save(&repo, Ad::new("keep me", "desc", user.id)).await.unwrap();

        let removed = Repository::<Ad>::delete_by_id(&repo, Uuid::now_v7()).await.unwrap();

        assert!(!removed);
        assert_eq!(count_ads(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_ad() {
        let (repo, user) = repo_with_user().await;
        let ad = Repository::<Ad>::save(&repo, Ad::new("title to delete", "description to delete", user.id))
            .await
            .unwrap();

        assert!(Repository::<Ad>::delete_by_id(&repo, ad.id).await.unwrap());
        assert_eq!(repo.find_by_title("title to delete").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_ad_title_is_conflict() {
        let (repo, user) = repo_with_user().await;
        Repository::<Ad>::save(&repo, Ad::new("same", "one", user.id)).await.unwrap();

        let err = Repository::<Ad>::save(&repo, Ad::new("same", "two", user.id)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(count_ads(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let (repo, _) = repo_with_user().await;
        let err = Repository::<User>::save(&repo, User::new("testUser", "other", None)).await.unwrap_err();
        assert_eq!(err, AppError::Conflict("username is already taken".into()));
    }

    #[tokio::test]
    async fn test_unknown_author_is_rejected() {
        let (repo, _) = repo_with_user().await;
        let err = Repository::<Post>::save(&repo, Post::new("t", "b", Uuid::now_v7())).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_posts_listed_in_creation_order() {
        let (repo, user) = repo_with_user().await;
        for title in ["first", "second", "third"] {
            Repository::<Post>::save(&repo, Post::new(title, "body", user.id)).await.unwrap();
        }

        let titles: Vec<String> = Repository::<Post>::find_all(&repo)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (repo, user) = repo_with_user().await;
        let mut session = repo.create_session(LoginSession::new(user.id)).await.unwrap();
        assert_eq!(repo.find_session(session.id).await.unwrap(), Some(session.clone()));

        session.touch();
        assert!(repo.touch_session(&session).await.unwrap());
        let touched = repo.find_session(session.id).await.unwrap().unwrap();
        assert_eq!(touched.created_at, session.created_at);
        assert!(touched.last_seen >= touched.created_at);

        assert!(repo.delete_session(session.id).await.unwrap());
        assert_eq!(repo.find_session(session.id).await.unwrap(), None);
        assert!(!repo.delete_session(session.id).await.unwrap());
        assert!(!repo.touch_session(&session).await.unwrap());
        assert_eq!(repo.find_session(session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_deleting_user_drops_their_sessions() {
        let (repo, user) = repo_with_user().await;
        let session = repo.create_session(LoginSession::new(user.id)).await.unwrap();

        assert!(Repository::<User>::delete_by_id(&repo, user.id).await.unwrap());
        assert_eq!(repo.find_session(session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let (repo, user) = repo_with_user().await;
        assert_eq!(repo.find_by_username("testUser").await.unwrap(), Some(user));
        assert_eq!(repo.find_by_username("nobody").await.unwrap(), None);
    }
}
