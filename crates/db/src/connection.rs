//! Pool setup for the conversation log.
//!
//! The log sees one short write burst per dialog turn (record, then settle),
//! so the pool is sized from the `database` config section and the sqlite
//! busy timeout tracks the acquire timeout: a writer stalled on contention
//! fails on the same clock the caller is already waiting on.

use std::time::Duration;

use salesdesk_core::config::DatabaseConfig;
use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&config.url, config.max_connections, config.timeout_secs).await
}

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let acquire_timeout = Duration::from_secs(timeout_secs.max(1));
    // Config validation caps timeout_secs at 300, so this cannot overflow.
    let busy_timeout_ms = timeout_secs.max(1) * 1000;

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(acquire_timeout)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use salesdesk_core::config::DatabaseConfig;

    use super::{connect, connect_with_settings};

    #[tokio::test]
    async fn busy_timeout_follows_the_configured_acquire_timeout() {
        let pool = connect_with_settings("sqlite::memory:", 1, 7).await.expect("connect");

        let busy_timeout_ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .expect("read busy_timeout");
        assert_eq!(busy_timeout_ms, 7_000);
    }

    #[tokio::test]
    async fn connect_reads_the_database_config_section() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 2,
            timeout_secs: 3,
        };
        let pool = connect(&config).await.expect("connect");

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("read foreign_keys");
        assert_eq!(foreign_keys, 1);

        let busy_timeout_ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .expect("read busy_timeout");
        assert_eq!(busy_timeout_ms, 3_000);
    }

    #[tokio::test]
    async fn zero_settings_are_clamped_to_usable_minimums() {
        let pool = connect_with_settings("sqlite::memory:", 0, 0).await.expect("connect");

        let busy_timeout_ms: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&pool)
            .await
            .expect("read busy_timeout");
        assert_eq!(busy_timeout_ms, 1_000);
    }
}
