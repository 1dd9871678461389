//! In-memory store. Serves the test suite and development runs where no
//! DATABASE_URL is configured. Same observable behavior as the Postgres
//! store, including sequential id assignment and aggregate overwrite.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{ChatStore, StorageError};
use crate::shared::models::{Chat, Message, NewChat, NewMessage, Sentiment, UrgencyTier, User};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    chats: Vec<Chat>,
    messages: Vec<Message>,
    next_chat_id: i32,
    next_message_id: i32,
}

pub struct MemoryChatStore {
    inner: Mutex<Inner>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_chat_id: 1,
                next_message_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Store preloaded with one user and one chat so a fresh development
    /// server can accept messages immediately.
    pub fn seeded() -> Self {
        let now = Utc::now();
        Self::with_fixtures(
            vec![User {
                id: 1,
                username: "demo".to_string(),
                email: "demo@example.com".to_string(),
                is_active: true,
                created_at: now,
            }],
            vec![Chat {
                id: 1,
                title: "Conversación de bienvenida".to_string(),
                description: None,
                aggregate_sentiment: Sentiment::Neutral.to_string(),
                aggregate_urgency: UrgencyTier::Normal.to_string(),
                created_at: now,
                updated_at: now,
            }],
        )
    }

    /// Store preloaded with the given rows. Test fixture constructor.
    pub fn with_fixtures(users: Vec<User>, chats: Vec<Chat>) -> Self {
        let next_chat_id = chats.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(Inner {
                users,
                chats,
                messages: Vec::new(),
                next_chat_id,
                next_message_id: 1,
            }),
        }
    }
}

impl Default for MemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn find_user(&self, user_id: i32) -> Result<Option<User>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_chat(&self, chat_id: i32) -> Result<Option<Chat>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn create_chat(&self, new_chat: NewChat) -> Result<Chat, StorageError> {
        let mut inner = self.inner.lock().await;
        let chat = Chat {
            id: inner.next_chat_id,
            title: new_chat.title,
            description: new_chat.description,
            aggregate_sentiment: new_chat.aggregate_sentiment,
            aggregate_urgency: new_chat.aggregate_urgency,
            created_at: new_chat.created_at,
            updated_at: new_chat.updated_at,
        };
        inner.next_chat_id += 1;
        inner.chats.push(chat.clone());
        Ok(chat)
    }

    async fn insert_message(&self, new_message: NewMessage) -> Result<Message, StorageError> {
        let mut inner = self.inner.lock().await;
        let message = Message {
            id: inner.next_message_id,
            chat_id: new_message.chat_id,
            author_user_id: new_message.author_user_id,
            content: new_message.content,
            status: new_message.status,
            sentiment: new_message.sentiment,
            urgency_tier: new_message.urgency_tier,
            urgency_score: new_message.urgency_score,
            reaction_glyph: new_message.reaction_glyph,
            is_bot: new_message.is_bot,
            alert_triggered: new_message.alert_triggered,
            created_at: new_message.created_at,
        };
        inner.next_message_id += 1;
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn messages_for_chat(&self, chat_id: i32) -> Result<Vec<Message>, StorageError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn update_chat_aggregate(
        &self,
        chat_id: i32,
        sentiment: Sentiment,
        urgency: UrgencyTier,
    ) -> Result<Chat, StorageError> {
        let mut inner = self.inner.lock().await;
        let chat = inner
            .chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or(StorageError::Database(diesel::result::Error::NotFound))?;
        chat.aggregate_sentiment = sentiment.to_string();
        chat.aggregate_urgency = urgency.to_string();
        chat.updated_at = Utc::now();
        Ok(chat.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Classification;

    #[tokio::test]
    async fn seeded_store_has_demo_user_and_chat() {
        let store = MemoryChatStore::seeded();
        assert!(store.find_user(1).await.unwrap().is_some());
        assert!(store.find_chat(1).await.unwrap().is_some());
        assert!(store.find_chat(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn message_ids_are_sequential() {
        let store = MemoryChatStore::seeded();
        let first = store
            .insert_message(NewMessage::from_bot(1, "hola"))
            .await
            .unwrap();
        let second = store
            .insert_message(NewMessage::from_bot(1, "sigo aquí"))
            .await
            .unwrap();
        assert_eq!(first.id + 1, second.id);
    }

    #[tokio::test]
    async fn messages_are_returned_in_creation_order() {
        let store = MemoryChatStore::seeded();
        let classification = Classification::from_sentiment(Sentiment::Negative);
        store
            .insert_message(NewMessage::from_user(1, 1, "primero", classification))
            .await
            .unwrap();
        store
            .insert_message(NewMessage::from_bot(1, "segundo"))
            .await
            .unwrap();

        let rows = store.messages_for_chat(1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].content, "primero");
        assert_eq!(rows[1].content, "segundo");
    }

    #[tokio::test]
    async fn aggregate_update_overwrites_and_bumps_timestamp() {
        let store = MemoryChatStore::seeded();
        let before = store.find_chat(1).await.unwrap().unwrap();

        let updated = store
            .update_chat_aggregate(1, Sentiment::Negative, UrgencyTier::High)
            .await
            .unwrap();
        assert_eq!(updated.aggregate_sentiment, "NEGATIVE");
        assert_eq!(updated.aggregate_urgency, "HIGH");
        assert!(updated.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn aggregate_update_on_missing_chat_is_an_error() {
        let store = MemoryChatStore::new();
        assert!(store
            .update_chat_aggregate(99, Sentiment::Neutral, UrgencyTier::Normal)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn created_chat_gets_fresh_id() {
        let store = MemoryChatStore::seeded();
        let chat = store
            .create_chat(NewChat::new("Nueva conversación", None))
            .await
            .unwrap();
        assert_eq!(chat.id, 2);
        assert_eq!(chat.aggregate_sentiment, "NEUTRAL");
    }
}
