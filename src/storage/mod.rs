//! Persistence behind a trait so the pipeline never touches diesel
//! directly. Postgres is the production store; the in-memory store
//! backs tests and credential-less development runs.

use async_trait::async_trait;

use crate::shared::models::{Chat, Message, NewChat, NewMessage, Sentiment, UrgencyTier, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryChatStore;
pub use postgres::PgChatStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("blocking task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_user(&self, user_id: i32) -> Result<Option<User>, StorageError>;

    async fn find_chat(&self, chat_id: i32) -> Result<Option<Chat>, StorageError>;

    async fn create_chat(&self, new_chat: NewChat) -> Result<Chat, StorageError>;

    async fn insert_message(&self, new_message: NewMessage) -> Result<Message, StorageError>;

    /// Messages of a chat in ascending creation order.
    async fn messages_for_chat(&self, chat_id: i32) -> Result<Vec<Message>, StorageError>;

    /// Overwrite the chat's aggregate mood with the latest classification
    /// and bump `updated_at`. Returns the updated row.
    async fn update_chat_aggregate(
        &self,
        chat_id: i32,
        sentiment: Sentiment,
        urgency: UrgencyTier,
    ) -> Result<Chat, StorageError>;
}
