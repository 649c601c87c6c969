//! HTTP request handlers

use super::requester::Requester;
use super::types::{
    ChatListResponse, ConfirmedNameRequest, CreateChatResponse, ErrorResponse, MessageView,
    MessagesResponse, ModelsResponse, SuccessResponse, TurnRequest,
};
use super::AppState;
use crate::chat::{ChatError, TurnReply};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::services::ServeDir;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let letters = ServeDir::new(&state.letter_dir);

    Router::new()
        // Chat lifecycle
        .route("/api/chats", post(create_chat).get(list_chats))
        .route("/api/chats/:id/messages", get(get_messages))
        // Turn submission
        .route("/api/chats/:id/turns", post(submit_turn))
        .route("/api/chats/:id/confirmed-name", put(set_confirmed_name))
        // Model info
        .route("/api/models", get(list_models))
        // Version
        .route("/version", get(get_version))
        // Generated sanction letters
        .nest_service("/letters", letters)
        .with_state(state)
}

// ============================================================
// Chat Lifecycle
// ============================================================

async fn create_chat(
    State(state): State<AppState>,
    Requester(requester): Requester,
) -> Result<(StatusCode, Json<CreateChatResponse>), AppError> {
    let chat = state.chats.create_chat(&requester).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateChatResponse { chat_id: chat.id }),
    ))
}

async fn list_chats(
    State(state): State<AppState>,
    Requester(requester): Requester,
) -> Result<Json<ChatListResponse>, AppError> {
    let chats = state.chats.list_chats(&requester).await?;
    Ok(Json(ChatListResponse { chats }))
}

async fn get_messages(
    State(state): State<AppState>,
    Requester(requester): Requester,
    Path(chat_id): Path<String>,
) -> Result<Json<MessagesResponse>, AppError> {
    let turns = state.chats.get_turns(&requester, &chat_id).await?;
    Ok(Json(MessagesResponse {
        messages: turns.into_iter().map(MessageView::from).collect(),
    }))
}

// ============================================================
// Turn Submission
// ============================================================

async fn submit_turn(
    State(state): State<AppState>,
    Requester(requester): Requester,
    Path(chat_id): Path<String>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnReply>, AppError> {
    let reply = state
        .chats
        .submit_turn(&requester, &chat_id, &req.text)
        .await?;
    Ok(Json(reply))
}

async fn set_confirmed_name(
    State(state): State<AppState>,
    Requester(requester): Requester,
    Path(chat_id): Path<String>,
    Json(req): Json<ConfirmedNameRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .chats
        .set_confirmed_name(&requester, &chat_id, req.name.as_deref())
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Model Info
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("loan-desk ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => AppError::BadRequest(err.to_string()),
            ChatError::ChatNotFound(_) => AppError::NotFound(err.to_string()),
            ChatError::Store(_) => {
                tracing::error!(error = %err, "Chat storage failed");
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatService, DatabaseStore};
    use crate::db::Database;
    use crate::dialogue::testing::MockLlmClient;
    use crate::dialogue::{TurnPolicy, TurnProcessor};
    use crate::llm::{LlmService, ModelRegistry, RegistryLlmClient};
    use crate::sanction::FsLetterStore;
    use crate::verification::FixtureVerification;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        state: AppState,
        llm: Arc<MockLlmClient>,
        _letters: tempfile::TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            let letters = tempfile::tempdir().unwrap();
            let llm = Arc::new(MockLlmClient::new("mock"));
            let registry = Arc::new(ModelRegistry::from_services(
                vec![llm.clone() as Arc<dyn LlmService>],
                "mock",
            ));
            let processor = TurnProcessor::new(
                RegistryLlmClient::new(registry.clone(), "mock".to_string()),
                FixtureVerification::bundled().unwrap(),
                FsLetterStore::new(letters.path(), "/letters"),
                TurnPolicy::default(),
            );
            let chats = ChatService::new(
                DatabaseStore::new(Database::open_in_memory().unwrap()),
                processor,
            );
            let state = AppState::new(chats, registry, letters.path().to_path_buf());
            Self {
                state,
                llm,
                _letters: letters,
            }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            requester: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Vec<u8>) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(requester) = requester {
                builder = builder.header("X-Requester-Id", requester);
            }
            let body = match body {
                Some(json) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            let response = create_router(self.state.clone())
                .oneshot(builder.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, bytes.to_vec())
        }

        async fn json(
            &self,
            method: Method,
            uri: &str,
            requester: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let (status, bytes) = self.send(method, uri, requester, body).await;
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        async fn create_chat(&self, requester: &str) -> String {
            let (status, body) = self
                .json(Method::POST, "/api/chats", Some(requester), None)
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["chat_id"].as_str().unwrap().to_string()
        }
    }

    #[tokio::test]
    async fn test_missing_requester_is_unauthorized() {
        let app = TestApp::new();
        let (status, body) = app.json(Method::GET, "/api/chats", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains("x-requester-id"));
    }

    #[tokio::test]
    async fn test_create_and_list_chats() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;
        app.create_chat("user_b").await;

        let (status, body) = app
            .json(Method::GET, "/api/chats", Some("user_a"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let chats = body["chats"].as_array().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["chat_id"], json!(chat_id));
        assert_eq!(chats[0]["title"], json!("New Chat"));
    }

    #[tokio::test]
    async fn test_empty_turn_is_bad_request() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;

        let (status, _) = app
            .json(
                Method::POST,
                &format!("/api/chats/{chat_id}/turns"),
                Some("user_a"),
                Some(json!({ "text": "  " })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_chat_is_not_found() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;

        let (status, _) = app
            .json(
                Method::GET,
                &format!("/api/chats/{chat_id}/messages"),
                Some("user_b"),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_advisory_turn_round_trip() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;
        app.llm.queue_text("A personal loan can cover that. Shall we check eligibility?");

        let (status, body) = app
            .json(
                Method::POST,
                &format!("/api/chats/{chat_id}/turns"),
                Some("user_a"),
                Some(json!({ "text": "Can I borrow for a wedding?" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["reply"],
            json!("A personal loan can cover that. Shall we check eligibility?")
        );
        assert_eq!(body["title"], json!("Can I borrow for a wedding?..."));
        assert_eq!(body["error_kind"], Value::Null);

        let (_, body) = app
            .json(
                Method::GET,
                &format!("/api/chats/{chat_id}/messages"),
                Some("user_a"),
                None,
            )
            .await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], json!("user"));
        assert_eq!(messages[1]["role"], json!("bot"));
    }

    #[tokio::test]
    async fn test_verification_turn_serves_letter() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;
        app.llm.queue_text("[AGENT_TASK: RUN_KYC: ABCDE1234F]");

        let (status, body) = app
            .json(
                Method::POST,
                &format!("/api/chats/{chat_id}/turns"),
                Some("user_a"),
                Some(json!({ "text": "My PAN is ABCDE1234F" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], json!("Loan Approved for Asha Rao"));

        let reply = body["reply"].as_str().unwrap();
        assert!(reply.contains("Credit Score: 750"));
        assert!(reply.contains("₹7,50,000"));
        let (_, link) = reply.rsplit_once("](").unwrap();
        let url = link.trim_end_matches(')');
        assert!(url.starts_with("/letters/Sanction_Letter_Asha_Rao_"));

        let (status, pdf) = app.send(Method::GET, url, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_rejected_subject_gets_lookup_message() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;
        app.llm.queue_text("[AGENT_TASK: RUN_KYC: PQRST3456U]");

        let (_, body) = app
            .json(
                Method::POST,
                &format!("/api/chats/{chat_id}/turns"),
                Some("user_a"),
                Some(json!({ "text": "PQRST3456U" })),
            )
            .await;
        assert_eq!(
            body["reply"],
            json!("Sorry, Vikram Mehta, we are unable to approve a loan for your profile at this time.")
        );
        assert_eq!(body["title"], json!("PQRST3456U..."));
    }

    #[tokio::test]
    async fn test_confirmed_name_endpoint() {
        let app = TestApp::new();
        let chat_id = app.create_chat("user_a").await;

        let (status, body) = app
            .json(
                Method::PUT,
                &format!("/api/chats/{chat_id}/confirmed-name"),
                Some("user_a"),
                Some(json!({ "name": "Asha Rao Iyer" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));

        app.llm.queue_text("[AGENT_TASK: RUN_KYC: ABCDE1234F]");
        let (_, body) = app
            .json(
                Method::POST,
                &format!("/api/chats/{chat_id}/turns"),
                Some("user_a"),
                Some(json!({ "text": "ABCDE1234F" })),
            )
            .await;
        assert_eq!(body["title"], json!("Loan Approved for Asha Rao Iyer"));
    }

    #[tokio::test]
    async fn test_models_and_version() {
        let app = TestApp::new();
        let (status, body) = app.json(Method::GET, "/api/models", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["default"], json!("mock"));

        let (status, bytes) = app.send(Method::GET, "/version", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(bytes).unwrap().starts_with("loan-desk "));
    }
}
