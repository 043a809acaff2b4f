//! Conversation log repository.
//!
//! Every dialog turn is recorded as `processing` before routing and settled
//! as `completed` or `failed` afterwards. A turn stuck in `processing` marks
//! a crash mid-route, which is exactly the signal an operator wants.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::DbPool;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnStatus {
    Processing,
    Completed,
    Failed,
}

impl TurnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    fn parse(value: &str) -> Result<Self, RepositoryError> {
        match value {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(RepositoryError::Decode(format!("unknown turn status `{other}`"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationTurn {
    pub id: String,
    pub session_id: Option<String>,
    pub intent_name: String,
    pub request_json: String,
    pub response_json: Option<String>,
    pub status: TurnStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    /// Fresh `processing` record for an incoming turn.
    pub fn begin(
        session_id: Option<String>,
        intent_name: impl Into<String>,
        request_json: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            intent_name: intent_name.into(),
            request_json: request_json.into(),
            response_json: None,
            status: TurnStatus::Processing,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn record_turn(&self, turn: ConversationTurn) -> Result<(), RepositoryError>;
    async fn complete_turn(&self, id: &str, response_json: &str) -> Result<(), RepositoryError>;
    async fn fail_turn(&self, id: &str) -> Result<(), RepositoryError>;
    async fn find_turn(&self, id: &str) -> Result<Option<ConversationTurn>, RepositoryError>;
    async fn list_session_turns(
        &self,
        session_id: &str,
    ) -> Result<Vec<ConversationTurn>, RepositoryError>;
}

pub struct SqlConversationRepository {
    pool: DbPool,
}

impl SqlConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for SqlConversationRepository {
    async fn record_turn(&self, turn: ConversationTurn) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO conversation_turn (
                id,
                session_id,
                intent_name,
                request_json,
                response_json,
                status,
                created_at,
                completed_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&turn.id)
        .bind(&turn.session_id)
        .bind(&turn.intent_name)
        .bind(&turn.request_json)
        .bind(&turn.response_json)
        .bind(turn.status.as_str())
        .bind(turn.created_at.to_rfc3339())
        .bind(turn.completed_at.map(|at| at.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn complete_turn(&self, id: &str, response_json: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE conversation_turn
             SET response_json = ?, status = 'completed', completed_at = ?
             WHERE id = ?",
        )
        .bind(response_json)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fail_turn(&self, id: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE conversation_turn
             SET status = 'failed', completed_at = ?
             WHERE id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_turn(&self, id: &str) -> Result<Option<ConversationTurn>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                id,
                session_id,
                intent_name,
                request_json,
                response_json,
                status,
                created_at,
                completed_at
             FROM conversation_turn
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(turn_from_row).transpose()
    }

    async fn list_session_turns(
        &self,
        session_id: &str,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                id,
                session_id,
                intent_name,
                request_json,
                response_json,
                status,
                created_at,
                completed_at
             FROM conversation_turn
             WHERE session_id = ?
             ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(turn_from_row).collect()
    }
}

fn turn_from_row(row: SqliteRow) -> Result<ConversationTurn, RepositoryError> {
    Ok(ConversationTurn {
        id: row.get::<String, _>("id"),
        session_id: row.get::<Option<String>, _>("session_id"),
        intent_name: row.get::<String, _>("intent_name"),
        request_json: row.get::<String, _>("request_json"),
        response_json: row.get::<Option<String>, _>("response_json"),
        status: TurnStatus::parse(&row.get::<String, _>("status"))?,
        created_at: parse_timestamp(&row.get::<String, _>("created_at"))?,
        completed_at: row
            .get::<Option<String>, _>("completed_at")
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("bad timestamp `{raw}`: {error}")))
}

/// In-memory implementation for tests and the offline simulator.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    turns: RwLock<HashMap<String, ConversationTurn>>,
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn record_turn(&self, turn: ConversationTurn) -> Result<(), RepositoryError> {
        let mut turns = self.turns.write().await;
        turns.insert(turn.id.clone(), turn);
        Ok(())
    }

    async fn complete_turn(&self, id: &str, response_json: &str) -> Result<(), RepositoryError> {
        let mut turns = self.turns.write().await;
        if let Some(turn) = turns.get_mut(id) {
            turn.response_json = Some(response_json.to_string());
            turn.status = TurnStatus::Completed;
            turn.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn fail_turn(&self, id: &str) -> Result<(), RepositoryError> {
        let mut turns = self.turns.write().await;
        if let Some(turn) = turns.get_mut(id) {
            turn.status = TurnStatus::Failed;
            turn.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn find_turn(&self, id: &str) -> Result<Option<ConversationTurn>, RepositoryError> {
        let turns = self.turns.read().await;
        Ok(turns.get(id).cloned())
    }

    async fn list_session_turns(
        &self,
        session_id: &str,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let turns = self.turns.read().await;
        let mut matching: Vec<ConversationTurn> = turns
            .values()
            .filter(|turn| turn.session_id.as_deref() == Some(session_id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matching)
    }
}
