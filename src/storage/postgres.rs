//! Postgres-backed store on a diesel r2d2 pool. Each call clones the
//! pool handle and runs the synchronous query on the blocking pool.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

use super::{ChatStore, StorageError};
use crate::shared::models::{Chat, Message, NewChat, NewMessage, Sentiment, UrgencyTier, User};
use crate::shared::schema::{chats, messages, users};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct PgChatStore {
    pool: DbPool,
}

impl PgChatStore {
    pub fn connect(database_url: &str) -> Result<Self, StorageError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .build(manager)
            .map_err(|e| StorageError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    fn get_conn(
        pool: &DbPool,
    ) -> Result<PooledConnection<ConnectionManager<PgConnection>>, StorageError> {
        pool.get().map_err(|e| StorageError::Pool(e.to_string()))
    }
}

async fn blocking<T, F>(pool: &DbPool, f: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> Result<T, StorageError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgChatStore::get_conn(&pool)?;
        f(&mut conn)
    })
    .await
    .map_err(|e| StorageError::Task(e.to_string()))?
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_user(&self, user_id: i32) -> Result<Option<User>, StorageError> {
        blocking(&self.pool, move |conn| {
            users::table
                .find(user_id)
                .first::<User>(conn)
                .optional()
                .map_err(StorageError::from)
        })
        .await
    }

    async fn find_chat(&self, chat_id: i32) -> Result<Option<Chat>, StorageError> {
        blocking(&self.pool, move |conn| {
            chats::table
                .find(chat_id)
                .first::<Chat>(conn)
                .optional()
                .map_err(StorageError::from)
        })
        .await
    }

    async fn create_chat(&self, new_chat: NewChat) -> Result<Chat, StorageError> {
        blocking(&self.pool, move |conn| {
            diesel::insert_into(chats::table)
                .values(&new_chat)
                .get_result::<Chat>(conn)
                .map_err(StorageError::from)
        })
        .await
    }

    async fn insert_message(&self, new_message: NewMessage) -> Result<Message, StorageError> {
        blocking(&self.pool, move |conn| {
            diesel::insert_into(messages::table)
                .values(&new_message)
                .get_result::<Message>(conn)
                .map_err(StorageError::from)
        })
        .await
    }

    async fn messages_for_chat(&self, chat_id: i32) -> Result<Vec<Message>, StorageError> {
        blocking(&self.pool, move |conn| {
            messages::table
                .filter(messages::chat_id.eq(chat_id))
                .order(messages::created_at.asc())
                .load::<Message>(conn)
                .map_err(StorageError::from)
        })
        .await
    }

    async fn update_chat_aggregate(
        &self,
        chat_id: i32,
        sentiment: Sentiment,
        urgency: UrgencyTier,
    ) -> Result<Chat, StorageError> {
        blocking(&self.pool, move |conn| {
            diesel::update(chats::table.find(chat_id))
                .set((
                    chats::aggregate_sentiment.eq(sentiment.to_string()),
                    chats::aggregate_urgency.eq(urgency.to_string()),
                    chats::updated_at.eq(Utc::now()),
                ))
                .get_result::<Chat>(conn)
                .map_err(StorageError::from)
        })
        .await
    }
}
