//! Storage seam for the chat service

use crate::db::{Chat, ChatSummary, Database, DbError, StoredTurn};
use crate::dialogue::Turn;
use async_trait::async_trait;

/// Storage for chats and their turns
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_chat(&self, requester_id: &str) -> Result<Chat, String>;

    /// `None` when no chat has this ID
    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, String>;

    async fn list_chats(&self, requester_id: &str) -> Result<Vec<ChatSummary>, String>;

    async fn get_turns(&self, chat_id: &str) -> Result<Vec<StoredTurn>, String>;

    async fn append_turns(&self, chat_id: &str, turns: &[Turn]) -> Result<(), String>;

    async fn set_title(&self, chat_id: &str, title: &str) -> Result<(), String>;

    async fn set_confirmed_name(&self, chat_id: &str, name: Option<&str>) -> Result<(), String>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for DatabaseStore {
    async fn create_chat(&self, requester_id: &str) -> Result<Chat, String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.db
            .create_chat(&id, requester_id)
            .map_err(|e| e.to_string())
    }

    async fn get_chat(&self, chat_id: &str) -> Result<Option<Chat>, String> {
        match self.db.get_chat(chat_id) {
            Ok(chat) => Ok(Some(chat)),
            Err(DbError::ChatNotFound(_)) => Ok(None),
            Err(e) => Err(e.to_string()),
        }
    }

    async fn list_chats(&self, requester_id: &str) -> Result<Vec<ChatSummary>, String> {
        self.db.list_chats(requester_id).map_err(|e| e.to_string())
    }

    async fn get_turns(&self, chat_id: &str) -> Result<Vec<StoredTurn>, String> {
        self.db.get_turns(chat_id).map_err(|e| e.to_string())
    }

    async fn append_turns(&self, chat_id: &str, turns: &[Turn]) -> Result<(), String> {
        self.db
            .append_turns(chat_id, turns)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn set_title(&self, chat_id: &str, title: &str) -> Result<(), String> {
        self.db.set_title(chat_id, title).map_err(|e| e.to_string())
    }

    async fn set_confirmed_name(&self, chat_id: &str, name: Option<&str>) -> Result<(), String> {
        self.db
            .set_confirmed_name(chat_id, name)
            .map_err(|e| e.to_string())
    }
}
