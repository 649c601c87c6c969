//! Model-facing prompt construction

use super::processor::TurnPolicy;
use super::transcript::{Speaker, Transcript, Turn};
use crate::llm::{LlmMessage, LlmRequest, SystemContent};

/// Persona and behavioral rules sent ahead of every transcript.
///
/// Rule 4 must stay in sync with [`super::trigger::RUN_VERIFICATION_MARKER`].
pub const SYSTEM_PROMPT: &str = r#"You are a professional loan sales assistant. Your tone is friendly, professional, and helpful.

**RULES:**
1. **Remember Context:** Read the entire chat history. If the user mentions a 'wedding' or a 'house' loan, REMEMBER that context for all future messages.
2. **Consult:** Have a natural conversation. Be an advisor.
3. **Propose Check:** After a helpful discussion, propose the eligibility check. Example: "If you'd like, I can run a quick pre-approval check for you. I would just need your 10-digit PAN card number to get started."
4. **Handle PAN:** When a user's *last message* is clearly a 10-digit PAN card number, you MUST respond *only* with the trigger: `[AGENT_TASK: RUN_KYC: PAN_NUMBER_HERE]`. Do not add any other text."#;

fn message_for(turn: &Turn) -> LlmMessage {
    match turn.speaker() {
        Speaker::Requester => LlmMessage::user(turn.text()),
        Speaker::Assistant => LlmMessage::assistant(turn.text()),
    }
}

/// System instruction followed by the whole transcript, speaker mapped to role
pub fn build_request(transcript: &Transcript, policy: &TurnPolicy) -> LlmRequest {
    LlmRequest {
        system: vec![SystemContent::new(SYSTEM_PROMPT)],
        messages: transcript.turns().iter().map(message_for).collect(),
        max_tokens: Some(policy.max_tokens),
        temperature: Some(policy.temperature),
    }
}
