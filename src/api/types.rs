//! API request and response types

use crate::db::{ChatSummary, StoredTurn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to submit a turn
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub text: String,
}

/// Request to set the confirmed name; `null` clears it
#[derive(Debug, Deserialize)]
pub struct ConfirmedNameRequest {
    pub name: Option<String>,
}

/// Response for chat creation
#[derive(Debug, Serialize)]
pub struct CreateChatResponse {
    pub chat_id: String,
}

/// Response with the requester's chats
#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatSummary>,
}

/// A stored turn as shown to clients
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub id: String,
    pub role: &'static str,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredTurn> for MessageView {
    fn from(turn: StoredTurn) -> Self {
        Self {
            id: turn.id,
            role: turn.role.as_str(),
            content: turn.content,
            created_at: turn.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageView>,
}

/// Response for update actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Model information for API response
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub description: String,
}

/// Response for available models
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
