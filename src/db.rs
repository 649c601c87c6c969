//! Database module
//!
//! Persistence for chats and their turns.

mod schema;

pub use schema::*;

use crate::chat_title::NEW_CHAT_TITLE;
use crate::dialogue::{Speaker, Turn};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Chat not found: {0}")]
    ChatNotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ==================== Chat Operations ====================

    /// Create a new chat titled "New Chat"
    pub fn create_chat(&self, id: &str, requester_id: &str) -> DbResult<Chat> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO chats (id, requester_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, requester_id, NEW_CHAT_TITLE, now.to_rfc3339()],
        )?;

        Ok(Chat {
            id: id.to_string(),
            requester_id: requester_id.to_string(),
            title: NEW_CHAT_TITLE.to_string(),
            confirmed_name: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get chat by ID
    pub fn get_chat(&self, id: &str) -> DbResult<Chat> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, requester_id, title, confirmed_name, created_at, updated_at
             FROM chats WHERE id = ?1",
            params![id],
            |row| {
                Ok(Chat {
                    id: row.get(0)?,
                    requester_id: row.get(1)?,
                    title: row.get(2)?,
                    confirmed_name: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()?
        .ok_or_else(|| DbError::ChatNotFound(id.to_string()))
    }

    /// A requester's chats, newest first
    pub fn list_chats(&self, requester_id: &str) -> DbResult<Vec<ChatSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, title, created_at FROM chats
             WHERE requester_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![requester_id], |row| {
            Ok(ChatSummary {
                chat_id: row.get(0)?,
                title: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    pub fn set_title(&self, id: &str, title: &str) -> DbResult<()> {
        self.update_chat(
            id,
            "UPDATE chats SET title = ?1, updated_at = ?2 WHERE id = ?3",
            Some(title),
        )
    }

    /// Set or clear the requester's confirmed name
    pub fn set_confirmed_name(&self, id: &str, name: Option<&str>) -> DbResult<()> {
        self.update_chat(
            id,
            "UPDATE chats SET confirmed_name = ?1, updated_at = ?2 WHERE id = ?3",
            name,
        )
    }

    fn update_chat(&self, id: &str, sql: &str, value: Option<&str>) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let updated = conn.execute(sql, params![value, now.to_rfc3339(), id])?;
        if updated == 0 {
            return Err(DbError::ChatNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== Turn Operations ====================

    /// Append turns in order, atomically
    pub fn append_turns(&self, chat_id: &str, turns: &[Turn]) -> DbResult<Vec<StoredTurn>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let now = Utc::now();

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM chats WHERE id = ?1)",
            params![chat_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::ChatNotFound(chat_id.to_string()));
        }

        let mut sequence_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sequence_id), 0) FROM messages WHERE chat_id = ?1",
            params![chat_id],
            |row| row.get(0),
        )?;

        let mut stored = Vec::with_capacity(turns.len());
        for turn in turns {
            sequence_id += 1;
            let id = uuid::Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO messages (message_id, chat_id, sequence_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    chat_id,
                    sequence_id,
                    turn.speaker().as_str(),
                    turn.text(),
                    now.to_rfc3339()
                ],
            )?;
            stored.push(StoredTurn {
                id,
                chat_id: chat_id.to_string(),
                sequence_id,
                role: turn.speaker(),
                content: turn.text().to_string(),
                created_at: now,
            });
        }

        tx.execute(
            "UPDATE chats SET updated_at = ?1 WHERE id = ?2",
            params![now.to_rfc3339(), chat_id],
        )?;
        tx.commit()?;

        Ok(stored)
    }

    /// Turns of a chat in insertion order
    pub fn get_turns(&self, chat_id: &str) -> DbResult<Vec<StoredTurn>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT message_id, chat_id, sequence_id, role, content, created_at
             FROM messages WHERE chat_id = ?1 ORDER BY sequence_id ASC",
        )?;

        let rows = stmt.query_map(params![chat_id], parse_turn_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}

fn parse_turn_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredTurn> {
    let role: String = row.get(3)?;
    let role = Speaker::parse(&role).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown message role: {role}").into(),
        )
    })?;
    Ok(StoredTurn {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        sequence_id: row.get(2)?,
        role,
        content: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
