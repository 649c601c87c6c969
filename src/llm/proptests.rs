//! Property-based tests for the chat-completions translation layer
//!
//! - Every transcript message survives translation in order
//! - The system prompt, when present, is always the first wire message
//! - Normalization never yields an empty reply

use super::openai::{ChatChoice, ChatMessage, ChatResponse, OpenAICompatService};
use super::types::{LlmMessage, LlmRequest, MessageRole, SystemContent};
use proptest::prelude::*;

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (
        prop_oneof![Just(MessageRole::User), Just(MessageRole::Assistant)],
        "[a-zA-Z0-9 _.!?,:\\[\\]]{0,80}",
    )
        .prop_map(|(role, content)| LlmMessage { role, content })
}

fn service() -> OpenAICompatService {
    OpenAICompatService::new("key", "test-model", "test-model", "http://localhost").unwrap()
}

proptest! {
    #[test]
    fn translation_preserves_order_and_content(
        messages in prop::collection::vec(arb_message(), 0..12),
        with_system in any::<bool>(),
    ) {
        let request = LlmRequest {
            system: if with_system { vec![SystemContent::new("persona")] } else { vec![] },
            messages: messages.clone(),
            max_tokens: Some(512),
            temperature: Some(0.7),
        };

        let wire = service().translate_request(&request);
        let offset = usize::from(with_system);
        prop_assert_eq!(wire.messages.len(), messages.len() + offset);
        if with_system {
            prop_assert_eq!(wire.messages[0].role.as_str(), "system");
        }
        for (sent, original) in wire.messages[offset..].iter().zip(&messages) {
            prop_assert_eq!(sent.role.as_str(), original.role.as_str());
            prop_assert_eq!(sent.content.as_deref(), Some(original.content.as_str()));
        }
    }

    #[test]
    fn normalization_never_yields_blank_text(content in prop::option::of("[ a-z]{0,20}")) {
        let resp = ChatResponse {
            choices: vec![ChatChoice {
                message: ChatMessage { role: "assistant".to_string(), content: content.clone() },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        };
        match OpenAICompatService::normalize_response(resp) {
            Ok(out) => {
                prop_assert!(!out.text.trim().is_empty());
                prop_assert_eq!(Some(out.text), content);
            }
            Err(_) => prop_assert!(content.map_or(true, |c| c.trim().is_empty())),
        }
    }
}
