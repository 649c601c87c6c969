//! Loan Desk - conversational personal-loan assistant
//!
//! Chats with a requester through a language model and, when the model asks
//! for it, runs a verification lookup, computes an offer and publishes a
//! sanction letter.

mod api;
mod chat;
mod chat_title;
mod db;
mod dialogue;
mod llm;
mod sanction;
mod verification;

use api::{create_router, AppState};
use chat::{ChatService, DatabaseStore};
use db::Database;
use dialogue::{TurnPolicy, TurnProcessor};
use llm::{LlmConfig, ModelRegistry, RegistryLlmClient};
use sanction::FsLetterStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verification::FixtureVerification;

fn home_path(relative: &str) -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    format!("{home}/.loan-desk/{relative}")
}

fn env_secs(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loan_desk=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let db_path =
        std::env::var("LOAN_DESK_DB_PATH").unwrap_or_else(|_| home_path("loan_desk.db"));
    let letter_dir = PathBuf::from(
        std::env::var("LOAN_DESK_LETTER_DIR").unwrap_or_else(|_| home_path("letters")),
    );

    let port: u16 = std::env::var("LOAN_DESK_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let defaults = TurnPolicy::default();
    let policy = TurnPolicy {
        model_timeout: env_secs("LOAN_DESK_MODEL_TIMEOUT_SECS").unwrap_or(defaults.model_timeout),
        lookup_timeout: env_secs("LOAN_DESK_LOOKUP_TIMEOUT_SECS")
            .unwrap_or(defaults.lookup_timeout),
        ..defaults
    };

    // Ensure data directories exist
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&letter_dir)?;

    // Initialize database
    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!(
            "No LLM API keys configured. {}",
            ModelRegistry::missing_key_hint()
        );
    }

    // Verification source
    let verifier = match std::env::var("LOAN_DESK_VERIFICATION_FIXTURE") {
        Ok(path) => {
            tracing::info!(path = %path, "Loading verification fixture");
            FixtureVerification::from_path(&path)?
        }
        Err(_) => FixtureVerification::bundled()?,
    };
    tracing::info!(records = verifier.len(), "Verification source ready");

    // Create application state
    let processor = TurnProcessor::new(
        RegistryLlmClient::new(
            llm_registry.clone(),
            llm_registry.default_model_id().to_string(),
        ),
        verifier,
        FsLetterStore::new(&letter_dir, "/letters"),
        policy,
    );
    let chats = ChatService::new(DatabaseStore::new(db), processor);
    let state = AppState::new(chats, llm_registry, letter_dir);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Loan desk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
