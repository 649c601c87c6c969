//! Database schema and types

use crate::dialogue::{Speaker, Turn};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS chats (
    id TEXT PRIMARY KEY,
    requester_id TEXT NOT NULL,
    title TEXT NOT NULL,
    confirmed_name TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chats_requester ON chats(requester_id, created_at DESC);

CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    chat_id TEXT NOT NULL,
    sequence_id INTEGER NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,

    FOREIGN KEY (chat_id) REFERENCES chats(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_messages_chat ON messages(chat_id, sequence_id);
";

/// Chat record
#[derive(Debug, Clone, Serialize)]
pub struct Chat {
    pub id: String,
    pub requester_id: String,
    pub title: String,
    pub confirmed_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of a requester's chat list
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatSummary {
    pub chat_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted turn
#[derive(Debug, Clone, Serialize)]
pub struct StoredTurn {
    pub id: String,
    pub chat_id: String,
    pub sequence_id: i64,
    pub role: Speaker,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredTurn {
    pub fn to_turn(&self) -> Turn {
        Turn::new(self.role, self.content.clone())
    }
}
