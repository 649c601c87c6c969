//! Transcript and turn types

use serde::Serialize;

/// Who said a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Requester,
    Assistant,
}

impl Speaker {
    /// Stored role name
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::Requester => "user",
            Speaker::Assistant => "bot",
        }
    }

    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Speaker::Requester),
            "bot" | "assistant" => Some(Speaker::Assistant),
            _ => None,
        }
    }
}

/// One message exchanged in a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    speaker: Speaker,
    text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    pub fn requester(text: impl Into<String>) -> Self {
        Self::new(Speaker::Requester, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered turns of one chat plus the dialogue slots gathered so far.
///
/// The most recent turn is the one the caller just submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
    confirmed_name: Option<String>,
}

impl Transcript {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            confirmed_name: None,
        }
    }

    /// Attach the requester's confirmed name; blank names are ignored
    #[must_use]
    pub fn with_confirmed_name(mut self, name: Option<String>) -> Self {
        self.confirmed_name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        self
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn confirmed_name(&self) -> Option<&str> {
        self.confirmed_name.as_deref()
    }
}
