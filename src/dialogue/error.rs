//! Turn processing errors

use crate::llm::LlmError;
use std::time::Duration;
use thiserror::Error;

/// Why a turn could not produce its own reply.
///
/// Verification rejections are not errors: they are business outcomes and
/// become an ordinary reply.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("transcript has no requester turn")]
    EmptyTranscript,

    #[error("last turn must come from the requester")]
    LastTurnNotRequester,

    #[error("language model call failed: {0}")]
    UpstreamModel(#[from] LlmError),

    #[error("verification lookup timed out after {0:?}")]
    VerificationTimeout(Duration),

    #[error("verification lookup unavailable: {0}")]
    VerificationUnavailable(String),

    #[error("offer computation failed: {0}")]
    OfferComputation(String),
}

impl TurnError {
    /// Stable name for logs and API responses
    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::EmptyTranscript => "empty_transcript",
            TurnError::LastTurnNotRequester => "last_turn_not_requester",
            TurnError::UpstreamModel(_) => "upstream_model",
            TurnError::VerificationTimeout(_) => "verification_timeout",
            TurnError::VerificationUnavailable(_) => "verification_unavailable",
            TurnError::OfferComputation(_) => "offer_computation",
        }
    }
}
