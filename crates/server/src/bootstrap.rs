use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use salesdesk_agent::actions::ActionInvoker;
use salesdesk_agent::llm::{HttpLlmClient, LlmError};
use salesdesk_agent::router::IntentRouter;
use salesdesk_agent::store::{LocalObjectStore, NoopKnowledgeIndex};
use salesdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use salesdesk_db::{connect, migrations, DbPool, SqlConversationRepository};

use crate::dialog::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("completion client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let llm =
        HttpLlmClient::from_config(&config.llm, config.llm_api_key()).map_err(BootstrapError::Llm)?;
    let invoker = ActionInvoker::new(
        Arc::new(llm),
        Arc::new(LocalObjectStore::new(config.storage.root.clone())),
        Arc::new(NoopKnowledgeIndex),
        config.llm.timeout_secs,
    );

    let state = AppState {
        router: Arc::new(IntentRouter::new(invoker)),
        conversations: Arc::new(SqlConversationRepository::new(db_pool.clone())),
    };

    info!(
        event_name = "system.bootstrap.complete",
        model = %config.llm.model,
        "intent router assembled"
    );

    Ok(Application { config, db_pool, state })
}
