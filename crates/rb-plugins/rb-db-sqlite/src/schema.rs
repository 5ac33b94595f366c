//! Table definitions, applied idempotently on connect.

use sqlx::sqlite::SqlitePool;

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id          BLOB PRIMARY KEY NOT NULL,
        username    TEXT NOT NULL UNIQUE,
        password    TEXT NOT NULL,
        email       TEXT,
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id          BLOB PRIMARY KEY NOT NULL,
        title       TEXT NOT NULL,
        body        TEXT NOT NULL,
        author_id   BLOB NOT NULL REFERENCES users(id),
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS ads (
        id          BLOB PRIMARY KEY NOT NULL,
        title       TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL,
        owner_id    BLOB NOT NULL REFERENCES users(id),
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        id          BLOB PRIMARY KEY NOT NULL,
        user_id     BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at  TEXT NOT NULL,
        last_seen   TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_ads_owner ON ads(owner_id)",
];

pub(crate) async fn create(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}
