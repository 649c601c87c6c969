//! HTTP API for the loan desk
//!
//! Chat lifecycle, turn submission and the sanction letters produced by it.

mod handlers;
mod requester;
mod types;

pub use handlers::create_router;
pub use types::ModelInfo;

use crate::chat::ProductionChatService;
use crate::llm::ModelRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chats: Arc<ProductionChatService>,
    pub llm_registry: Arc<ModelRegistry>,
    /// Directory served under `/letters`
    pub letter_dir: PathBuf,
}

impl AppState {
    pub fn new(
        chats: ProductionChatService,
        llm_registry: Arc<ModelRegistry>,
        letter_dir: PathBuf,
    ) -> Self {
        Self {
            chats: Arc::new(chats),
            llm_registry,
            letter_dir,
        }
    }
}
