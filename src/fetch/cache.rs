// src/fetch/cache.rs
// =============================================================================
// SQLite-backed HTTP response cache.
//
// Only successful responses are stored, keyed by URL. Many page tasks read
// and write the cache at once; SQLite's locking plus upserts keep the store
// consistent without any coordination on our side.
//
// Rust concepts:
// - sqlx pools: a Pool<Sqlite> is a cloneable handle to shared connections
// - Option<Duration>: "no TTL" is None, not a magic zero
// =============================================================================

use crate::error::Error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::FetchedPage;

/// Handle to the response cache. Cloning shares the same pool.
#[derive(Clone, Debug)]
pub struct HttpCache {
    pool: Pool<Sqlite>,
    /// Entries older than this are treated as missing; None never expires
    ttl: Option<Duration>,
}

impl HttpCache {
    /// Open (or create) the cache database at `path`, creating parent dirs.
    pub async fn open(path: &Path, ttl: Option<Duration>) -> Result<Self, Error> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        let cache = HttpCache { pool, ttl };
        cache.migrate().await?;
        Ok(cache)
    }

    async fn migrate(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                url TEXT PRIMARY KEY,
                status INTEGER NOT NULL,
                body TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Looks up a fresh cached response for `url`
    pub async fn get(&self, url: &str) -> Result<Option<FetchedPage>, Error> {
        let row: Option<(i64, String, i64)> =
            sqlx::query_as("SELECT status, body, fetched_at FROM responses WHERE url = ?")
                .bind(url)
                .fetch_optional(&self.pool)
                .await?;

        let Some((status, body, fetched_at)) = row else {
            return Ok(None);
        };

        if let Some(ttl) = self.ttl {
            let age = unix_timestamp().saturating_sub(fetched_at);
            if age < 0 || age as u64 >= ttl.as_secs() {
                return Ok(None);
            }
        }

        Ok(Some(FetchedPage {
            status: status as u16,
            body,
        }))
    }

    /// Stores (or replaces) the response for `url`
    pub async fn put(&self, url: &str, page: &FetchedPage) -> Result<(), Error> {
        self.put_at(url, page, unix_timestamp()).await
    }

    async fn put_at(&self, url: &str, page: &FetchedPage, fetched_at: i64) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO responses (url, status, body, fetched_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                status = excluded.status,
                body = excluded.body,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(url)
        .bind(page.status as i64)
        .bind(page.body.as_str())
        .bind(fetched_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is sqlx::query_as?
//    - It runs a SQL query and converts each row into a Rust type
//    - Here the type is a tuple (i64, String, i64), one field per column
//    - fetch_optional() gives Option<row>: None when the URL was never cached
//
// 2. Why .bind() instead of format!() into the SQL?
//    - bind() sends values separately from the query text
//    - A URL with a quote in it can never change the SQL
//
// 3. What is an upsert?
//    - INSERT ... ON CONFLICT DO UPDATE: insert a row, or replace it if
//      the key already exists, in one statement
//    - Two tasks storing the same URL cannot leave a half-written row
// -----------------------------------------------------------------------------

#[cfg(test)]
/// In-memory cache for tests. One connection, since every
/// ":memory:" connection is its own database.
pub(crate) async fn open_memory(ttl: Option<Duration>) -> Result<HttpCache, Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let cache = HttpCache { pool, ttl };
    cache.migrate().await?;
    Ok(cache)
}
