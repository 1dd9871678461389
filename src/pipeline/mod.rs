//! Message processing pipeline.
//!
//! One submission produces exactly one persisted user message, one
//! persisted bot message and one chat aggregate update, in that order.
//! Preconditions (chat and user must exist) are checked before anything
//! is written, so a rejected submission leaves no rows behind.

use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::llm::ResponseOrchestrator;
use crate::sentiment;
use crate::shared::models::{Chat, Message, NewMessage};
use crate::storage::{ChatStore, StorageError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessage {
    pub user_id: i32,
    pub chat_id: i32,
    pub content: String,
}

/// Everything a submission produced, returned to the caller in one piece.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutcome {
    pub user_message: Message,
    pub bot_message: Message,
    pub chat: Chat,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("chat {0} not found")]
    ChatNotFound(i32),
    #[error("user {0} not found")]
    UserNotFound(i32),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct MessagePipeline {
    store: Arc<dyn ChatStore>,
    orchestrator: ResponseOrchestrator,
}

impl MessagePipeline {
    pub fn new(store: Arc<dyn ChatStore>, orchestrator: ResponseOrchestrator) -> Self {
        Self { store, orchestrator }
    }

    pub async fn process(&self, submit: SubmitMessage) -> Result<PipelineOutcome, PipelineError> {
        let (chat, user) = tokio::join!(
            self.store.find_chat(submit.chat_id),
            self.store.find_user(submit.user_id)
        );
        chat?.ok_or(PipelineError::ChatNotFound(submit.chat_id))?;
        user?.ok_or(PipelineError::UserNotFound(submit.user_id))?;

        let classification = sentiment::classify(&submit.content);
        info!(
            "chat {}: message classified {} ({})",
            submit.chat_id, classification.sentiment, classification.urgency_tier
        );

        let user_message = self
            .store
            .insert_message(NewMessage::from_user(
                submit.chat_id,
                submit.user_id,
                &submit.content,
                classification.clone(),
            ))
            .await?;

        if user_message.alert_triggered {
            warn!(
                "chat {}: severe urgency from user {}, alert raised",
                submit.chat_id, submit.user_id
            );
        }

        let reply = self.orchestrator.respond(&submit.content).await;
        let bot_message = self
            .store
            .insert_message(NewMessage::from_bot(submit.chat_id, reply.reply_text))
            .await?;

        // Aggregate reflects the latest user message, not the bot reply.
        let chat = self
            .store
            .update_chat_aggregate(
                submit.chat_id,
                classification.sentiment,
                classification.urgency_tier,
            )
            .await?;

        Ok(PipelineOutcome {
            user_message,
            bot_message,
            chat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::conversational::{ConversationalGenerator, FirstPicker};
    use crate::storage::MemoryChatStore;

    fn pipeline_over(store: Arc<MemoryChatStore>) -> MessagePipeline {
        let orchestrator = ResponseOrchestrator::new(
            vec![],
            ConversationalGenerator::with_picker(Box::new(FirstPicker)),
        );
        MessagePipeline::new(store, orchestrator)
    }

    #[tokio::test]
    async fn unknown_chat_is_rejected_before_any_write() {
        let store = Arc::new(MemoryChatStore::seeded());
        let pipeline = pipeline_over(store.clone());

        let result = pipeline
            .process(SubmitMessage {
                user_id: 1,
                chat_id: 42,
                content: "hola".to_string(),
            })
            .await;

        assert!(matches!(result, Err(PipelineError::ChatNotFound(42))));
        assert!(store.messages_for_chat(42).await.unwrap().is_empty());
        assert!(store.messages_for_chat(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_before_any_write() {
        let store = Arc::new(MemoryChatStore::seeded());
        let pipeline = pipeline_over(store.clone());

        let result = pipeline
            .process(SubmitMessage {
                user_id: 9,
                chat_id: 1,
                content: "hola".to_string(),
            })
            .await;

        assert!(matches!(result, Err(PipelineError::UserNotFound(9))));
        assert!(store.messages_for_chat(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submission_persists_pair_and_updates_aggregate() {
        let store = Arc::new(MemoryChatStore::seeded());
        let pipeline = pipeline_over(store.clone());

        let outcome = pipeline
            .process(SubmitMessage {
                user_id: 1,
                chat_id: 1,
                content: "Me siento muy triste y no sé qué hacer".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome.user_message.sentiment, "NEGATIVE");
        assert_eq!(outcome.user_message.urgency_score, 3);
        assert!(outcome.user_message.alert_triggered);

        assert!(outcome.bot_message.is_bot);
        assert_eq!(outcome.bot_message.sentiment, "NEUTRAL");
        assert!(!outcome.bot_message.alert_triggered);
        assert!(!outcome.bot_message.content.is_empty());

        assert_eq!(outcome.chat.aggregate_sentiment, "NEGATIVE");
        assert_eq!(outcome.chat.aggregate_urgency, "HIGH");

        let rows = store.messages_for_chat(1).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_submissions_each_persist_their_own_pair() {
        let store = Arc::new(MemoryChatStore::seeded());
        let pipeline = pipeline_over(store.clone());

        for _ in 0..2 {
            pipeline
                .process(SubmitMessage {
                    user_id: 1,
                    chat_id: 1,
                    content: "hoy me siento feliz".to_string(),
                })
                .await
                .unwrap();
        }

        let rows = store.messages_for_chat(1).await.unwrap();
        assert_eq!(rows.len(), 4);
    }
}
