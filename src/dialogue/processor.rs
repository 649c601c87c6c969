//! Dialogue turn processor
//!
//! transcript -> model call -> trigger detection -> (verification -> offer
//! -> letter) -> reply. Each external call is awaited in sequence and bounded
//! by a timeout; nothing is shared between calls to [`TurnProcessor::process_turn`].

use super::error::TurnError;
use super::offer::{Offer, SanctionTerms};
use super::prompt::build_request;
use super::transcript::{Speaker, Transcript, Turn};
use super::trigger::HandoffTrigger;
use crate::chat_title::approval_title;
use crate::llm::{LlmError, LlmService};
use crate::sanction::LetterStore;
use crate::verification::{
    ineligible_message, EligibilityState, VerificationError, VerificationLookup,
};
use std::time::Duration;
use tokio::time::timeout;

/// Reply used when a turn fails for a technical reason
pub const GENERIC_APOLOGY: &str =
    "Sorry, something went wrong while processing your message. Please try again.";

/// Sampling and time bounds for one turn
#[derive(Debug, Clone)]
pub struct TurnPolicy {
    pub temperature: f32,
    pub max_tokens: u32,
    pub model_timeout: Duration,
    pub lookup_timeout: Duration,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
            model_timeout: Duration::from_secs(60),
            lookup_timeout: Duration::from_secs(10),
        }
    }
}

/// Reply plus the side effects the caller should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply_text: String,
    /// Set only when a verification succeeded
    pub title_hint: Option<String>,
    /// The requester's turn followed by the assistant's reply
    pub persist: Vec<Turn>,
}

impl TurnOutcome {
    fn new(requester_turn: &Turn, reply_text: String, title_hint: Option<String>) -> Self {
        Self {
            persist: vec![requester_turn.clone(), Turn::assistant(reply_text.clone())],
            reply_text,
            title_hint,
        }
    }

    /// Outcome substituted at the boundary when processing failed
    pub fn apology(requester_turn: &Turn) -> Self {
        Self::new(requester_turn, GENERIC_APOLOGY.to_string(), None)
    }
}

/// What a completed workflow contributes to the turn
struct WorkflowReply {
    text: String,
    title_hint: Option<String>,
}

impl WorkflowReply {
    fn rejected(text: String) -> Self {
        Self {
            text,
            title_hint: None,
        }
    }
}

/// Stateless turn processor over its three collaborators
pub struct TurnProcessor<L, V, D> {
    llm: L,
    verifier: V,
    letters: D,
    policy: TurnPolicy,
}

impl<L, V, D> TurnProcessor<L, V, D>
where
    L: LlmService,
    V: VerificationLookup,
    D: LetterStore,
{
    pub fn new(llm: L, verifier: V, letters: D, policy: TurnPolicy) -> Self {
        Self {
            llm,
            verifier,
            letters,
            policy,
        }
    }

    /// Produce the assistant's reply to the last requester turn.
    pub async fn process_turn(&self, transcript: &Transcript) -> Result<TurnOutcome, TurnError> {
        let last = transcript.last().ok_or(TurnError::EmptyTranscript)?;
        if last.speaker() != Speaker::Requester {
            return Err(TurnError::LastTurnNotRequester);
        }

        let request = build_request(transcript, &self.policy);
        let response = timeout(self.policy.model_timeout, self.llm.complete(&request))
            .await
            .map_err(|_| {
                LlmError::timeout(format!(
                    "No model response within {:?}",
                    self.policy.model_timeout
                ))
            })??;

        let Some(trigger) = HandoffTrigger::parse(&response.text) else {
            return Ok(TurnOutcome::new(last, response.text, None));
        };

        tracing::info!(kind = trigger.kind(), "Model requested agent hand-off");
        let reply = match trigger {
            HandoffTrigger::RunVerification { subject_id } => {
                self.run_verification(&subject_id, transcript.confirmed_name())
                    .await?
            }
        };

        Ok(TurnOutcome::new(last, reply.text, reply.title_hint))
    }

    async fn run_verification(
        &self,
        subject_id: &str,
        confirmed_name: Option<&str>,
    ) -> Result<WorkflowReply, TurnError> {
        let lookup = timeout(self.policy.lookup_timeout, self.verifier.lookup(subject_id))
            .await
            .map_err(|_| TurnError::VerificationTimeout(self.policy.lookup_timeout))?;

        let record = match lookup {
            Ok(record) => record,
            Err(VerificationError::Backend(message)) => {
                return Err(TurnError::VerificationUnavailable(message));
            }
            Err(e) => {
                let reason = e.rejection_message().unwrap_or_default();
                tracing::info!(subject_id, reason, "Verification rejected");
                return Ok(WorkflowReply::rejected(reason.to_string()));
            }
        };

        if record.eligibility == EligibilityState::IneligibleRisk {
            tracing::info!(subject_id, "Verification record marked high risk");
            return Ok(WorkflowReply::rejected(ineligible_message(
                &record.display_name,
            )));
        }

        let subject_name = confirmed_name.unwrap_or(&record.display_name);
        let terms = SanctionTerms::for_score(subject_name, record.score);
        let document_reference = self
            .letters
            .publish(&terms)
            .await
            .map_err(|e| TurnError::OfferComputation(e.to_string()))?;
        let offer = Offer {
            terms,
            document_reference,
        };

        tracing::info!(
            subject_id,
            score = record.score,
            amount = offer.terms.amount,
            "Loan pre-approved"
        );

        Ok(WorkflowReply {
            text: approval_reply(&offer, record.score),
            title_hint: Some(approval_title(&offer.terms.subject_name)),
        })
    }
}

fn approval_reply(offer: &Offer, score: u32) -> String {
    format!(
        "Great news, {name}! Your KYC is complete (Credit Score: {score}). You are pre-approved for a loan of ₹{amount}. Your sanction letter is ready: [Download Letter]({url})",
        name = offer.terms.subject_name,
        amount = offer.terms.amount_display(),
        url = offer.document_reference,
    )
}
