//! Readiness endpoint.
//!
//! Two checks, both about what a dialog turn actually needs: the
//! conversation log must be queryable through its migrated schema, and the
//! object-store root must exist (sales-analysis turns read from it). A bare
//! `SELECT 1` would pass on an unmigrated database, so the log check goes
//! through the real table.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use salesdesk_db::DbPool;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    storage_root: Arc<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub conversation_log: HealthCheck,
    pub object_store: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, storage_root: PathBuf) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { db_pool, storage_root: Arc::new(storage_root) })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let conversation_log = conversation_log_check(&state.db_pool).await;
    let object_store = object_store_check(&state.storage_root).await;
    let ready = conversation_log.status == "ready" && object_store.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        conversation_log,
        object_store,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn conversation_log_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM conversation_turn")
        .fetch_one(pool)
        .await
    {
        Ok(recorded_turns) => HealthCheck {
            status: "ready",
            detail: format!("conversation log reachable ({recorded_turns} turns recorded)"),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("conversation log query failed: {error}"),
        },
    }
}

async fn object_store_check(root: &Path) -> HealthCheck {
    match tokio::fs::metadata(root).await {
        Ok(metadata) if metadata.is_dir() => HealthCheck {
            status: "ready",
            detail: format!("object store root `{}` present", root.display()),
        },
        Ok(_) => HealthCheck {
            status: "degraded",
            detail: format!("object store root `{}` is not a directory", root.display()),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("object store root `{}` unreachable: {error}", root.display()),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use salesdesk_db::{connect_with_settings, migrations};

    use crate::health::{health, HealthState};

    fn temp_storage_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("salesdesk-health-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&root).expect("create storage root");
        root
    }

    #[tokio::test]
    async fn health_is_ready_with_a_migrated_log_and_present_storage_root() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        let root = temp_storage_root("ready");

        let (status, Json(payload)) = health(State(HealthState {
            db_pool: pool.clone(),
            storage_root: Arc::new(root.clone()),
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert!(payload.conversation_log.detail.contains("0 turns recorded"));

        pool.close().await;
        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn unmigrated_database_degrades_the_conversation_log_check() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        let root = temp_storage_root("unmigrated");

        let (status, Json(payload)) = health(State(HealthState {
            db_pool: pool.clone(),
            storage_root: Arc::new(root.clone()),
        }))
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.conversation_log.status, "degraded");

        pool.close().await;
        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn missing_storage_root_degrades_the_object_store_check() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        migrations::run_pending(&pool).await.expect("run migrations");

        let (status, Json(payload)) = health(State(HealthState {
            db_pool: pool,
            storage_root: Arc::new(PathBuf::from("/nonexistent/salesdesk-objects")),
        }))
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.conversation_log.status, "ready");
        assert_eq!(payload.object_store.status, "degraded");
    }
}
