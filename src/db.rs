//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a SQLite connection pool
//! - Running database migrations automatically

use std::{str::FromStr, time::Duration};

use sqlx::{
    Pool, Sqlite, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Type alias for the SQLite connection pool.
///
/// Every handler and service receives this handle explicitly; there is no
/// process-wide connection state.
pub type DbPool = Pool<Sqlite>;

/// Create a new SQLite connection pool.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string (e.g. `sqlite://hsa.db`)
/// * `max_connections` - upper bound on pooled connections
///
/// # Configuration
///
/// - The database file is created if it does not exist yet
/// - `PRAGMA foreign_keys = ON` is applied to every connection, so the
///   cascade and set-null rules of the schema are enforced by the store
/// - A connection waits up to five seconds for a held write lock
///
/// # Errors
///
/// Returns an error if the connection string is invalid or the database
/// file cannot be opened.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Create a pool backed by a private in-memory database.
///
/// An in-memory SQLite database lives only as long as its connection, so the
/// pool holds exactly one connection and never retires it.
pub async fn create_in_memory_pool() -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Start a transaction that holds the database write lock from its first
/// statement.
///
/// A deferred SQLite transaction that reads and then writes cannot upgrade
/// its lock while another writer is active and fails at once with
/// `SQLITE_BUSY`, ignoring the busy timeout. Taking the lock up front makes
/// competing read-modify-write units queue on the busy timeout instead.
pub async fn begin_write(pool: &DbPool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each one runs
/// only once per database.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro embeds ./migrations at compile time
    sqlx::migrate!("./migrations").run(pool).await
}

/// File-backed database with the schema applied and `max_connections`
/// pooled connections. The directory is removed when the guard drops.
#[cfg(test)]
pub(crate) async fn migrated_file_pool(max_connections: u32) -> (DbPool, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let pool = create_pool(&url, max_connections)
        .await
        .expect("file pool should open");
    run_migrations(&pool)
        .await
        .expect("migrations should apply");
    (pool, dir)
}

/// Fresh in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn migrated_test_pool() -> DbPool {
    let pool = create_in_memory_pool()
        .await
        .expect("in-memory pool should open");
    run_migrations(&pool)
        .await
        .expect("migrations should apply");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = migrated_test_pool().await;

        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);

        let orphan = sqlx::query(
            "INSERT INTO cards (account_id, card_number, last4_digits, token) VALUES (999, '0000111122223333', '3333', 'tok')",
        )
        .execute(&pool)
        .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = create_in_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }
}
