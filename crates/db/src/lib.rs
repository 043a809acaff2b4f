//! SQLite persistence: pool setup, migrations, and the conversation log.

pub mod connection;
pub mod conversations;
pub mod migrations;

pub use connection::{connect, connect_with_settings, DbPool};
pub use conversations::{
    ConversationRepository, ConversationTurn, InMemoryConversationRepository, RepositoryError,
    SqlConversationRepository, TurnStatus,
};
