//! Chat service
//!
//! Owns the boundary around the turn processor: ownership checks, per-chat
//! serialization, persistence of each turn pair and chat titling.

mod store;

pub use store::{ChatStore, DatabaseStore};

use crate::chat_title::resolve_title;
use crate::db::{Chat, ChatSummary, StoredTurn};
use crate::dialogue::{Transcript, Turn, TurnOutcome, TurnProcessor};
use crate::llm::{LlmService, RegistryLlmClient};
use crate::sanction::{FsLetterStore, LetterStore};
use crate::verification::{FixtureVerification, VerificationLookup};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Chat service wired to the production collaborators
pub type ProductionChatService =
    ChatService<DatabaseStore, RegistryLlmClient, FixtureVerification, FsLetterStore>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("chat not found: {0}")]
    ChatNotFound(String),
    #[error("storage error: {0}")]
    Store(String),
}

/// What the requester gets back for a submitted turn
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TurnReply {
    pub reply: String,
    /// New chat title, when this turn changed it
    pub title: Option<String>,
    /// Failure kind when `reply` is the generic apology
    pub error_kind: Option<String>,
}

pub struct ChatService<S, L, V, D> {
    store: S,
    processor: TurnProcessor<L, V, D>,
    chat_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S, L, V, D> ChatService<S, L, V, D>
where
    S: ChatStore,
    L: LlmService,
    V: VerificationLookup,
    D: LetterStore,
{
    pub fn new(store: S, processor: TurnProcessor<L, V, D>) -> Self {
        Self {
            store,
            processor,
            chat_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create_chat(&self, requester_id: &str) -> Result<Chat, ChatError> {
        let chat = self
            .store
            .create_chat(requester_id)
            .await
            .map_err(ChatError::Store)?;
        tracing::info!(chat_id = %chat.id, requester = %requester_id, "Created chat");
        Ok(chat)
    }

    pub async fn list_chats(&self, requester_id: &str) -> Result<Vec<ChatSummary>, ChatError> {
        self.store
            .list_chats(requester_id)
            .await
            .map_err(ChatError::Store)
    }

    pub async fn get_turns(
        &self,
        requester_id: &str,
        chat_id: &str,
    ) -> Result<Vec<StoredTurn>, ChatError> {
        self.owned_chat(requester_id, chat_id).await?;
        self.store
            .get_turns(chat_id)
            .await
            .map_err(ChatError::Store)
    }

    /// Set or clear the name the requester confirmed for their letter
    pub async fn set_confirmed_name(
        &self,
        requester_id: &str,
        chat_id: &str,
        name: Option<&str>,
    ) -> Result<(), ChatError> {
        self.owned_chat(requester_id, chat_id).await?;
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        self.store
            .set_confirmed_name(chat_id, name)
            .await
            .map_err(ChatError::Store)
    }

    /// Process one requester message and persist the resulting turn pair.
    ///
    /// Processing failures never reach the caller: they are logged and the
    /// requester gets the generic apology, which is persisted like any reply.
    pub async fn submit_turn(
        &self,
        requester_id: &str,
        chat_id: &str,
        text: &str,
    ) -> Result<TurnReply, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        // Unknown or foreign chats are rejected before a lock entry exists
        self.owned_chat(requester_id, chat_id).await?;
        let lease = self.chat_lock(chat_id);
        let _guard = lease.lock.lock().await;

        // Re-read under the lock: the confirmed name may have changed
        let chat = self.owned_chat(requester_id, chat_id).await?;
        let stored = self
            .store
            .get_turns(chat_id)
            .await
            .map_err(ChatError::Store)?;
        let is_first_turn = stored.is_empty();

        let requester_turn = Turn::requester(text);
        let mut turns: Vec<Turn> = stored.iter().map(StoredTurn::to_turn).collect();
        turns.push(requester_turn.clone());
        let transcript = Transcript::new(turns).with_confirmed_name(chat.confirmed_name);

        let (outcome, error_kind) = match self.processor.process_turn(&transcript).await {
            Ok(outcome) => (outcome, None),
            Err(e) => {
                tracing::warn!(
                    chat_id = %chat_id,
                    error_kind = e.kind(),
                    error = %e,
                    "Turn failed, replying with apology"
                );
                (
                    TurnOutcome::apology(&requester_turn),
                    Some(e.kind().to_string()),
                )
            }
        };

        self.store
            .append_turns(chat_id, &outcome.persist)
            .await
            .map_err(ChatError::Store)?;

        let title = resolve_title(
            outcome.title_hint.as_deref(),
            is_first_turn.then_some(text),
        );
        // The turn pair is already stored; a failed title write only loses the title
        let title = match title {
            Some(title) => match self.store.set_title(chat_id, &title).await {
                Ok(()) => Some(title),
                Err(e) => {
                    tracing::warn!(chat_id = %chat_id, error = %e, "Failed to set chat title");
                    None
                }
            },
            None => None,
        };

        Ok(TurnReply {
            reply: outcome.reply_text,
            title,
            error_kind,
        })
    }

    /// The chat, if it exists and belongs to `requester_id`
    async fn owned_chat(&self, requester_id: &str, chat_id: &str) -> Result<Chat, ChatError> {
        match self.store.get_chat(chat_id).await.map_err(ChatError::Store)? {
            Some(chat) if chat.requester_id == requester_id => Ok(chat),
            _ => Err(ChatError::ChatNotFound(chat_id.to_string())),
        }
    }

    fn chat_lock(&self, chat_id: &str) -> ChatLockLease<'_> {
        let lock = self
            .chat_locks
            .lock()
            .unwrap()
            .entry(chat_id.to_string())
            .or_default()
            .clone();
        ChatLockLease {
            locks: &self.chat_locks,
            chat_id: chat_id.to_string(),
            lock,
        }
    }
}

/// A handle on one chat's lock; the map entry goes away with its last lease
struct ChatLockLease<'a> {
    locks: &'a Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    chat_id: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for ChatLockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only handed out under the map lock, so the count is stable here.
        // Two references left means the map entry and this lease.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.chat_id);
        }
    }
}
