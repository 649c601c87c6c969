//! Mock collaborators for turn-processing tests

use crate::dialogue::SanctionTerms;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::sanction::{LetterError, LetterStore};
use crate::verification::{VerificationError, VerificationLookup, VerificationRecord};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
    delay: Mutex<Option<Duration>>,
    model_id: String,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
            model_id: model_id.into(),
        }
    }

    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn queue_text(&self, text: &str) {
        self.queue_response(LlmResponse::text(text));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Sleep this long before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Static Verification
// ============================================================================

/// Verification lookup answering from a fixed table
#[derive(Default)]
pub struct StaticVerification {
    answers: HashMap<String, Result<VerificationRecord, VerificationError>>,
    delay: Option<Duration>,
    lookups: Mutex<Vec<String>>,
}

impl StaticVerification {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(mut self, record: VerificationRecord) -> Self {
        self.answers.insert(record.subject_id.clone(), Ok(record));
        self
    }

    #[must_use]
    pub fn with_error(mut self, subject_id: &str, error: VerificationError) -> Self {
        self.answers.insert(subject_id.to_string(), Err(error));
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Identifiers looked up so far, in order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerificationLookup for StaticVerification {
    async fn lookup(&self, subject_id: &str) -> Result<VerificationRecord, VerificationError> {
        self.lookups.lock().unwrap().push(subject_id.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answers.get(subject_id).cloned().unwrap_or_else(|| {
            Err(VerificationError::not_found(
                subject_id,
                format!("no record for {subject_id}"),
            ))
        })
    }
}

// ============================================================================
// Memory Letter Store
// ============================================================================

/// Letter store that only records what it was asked to publish
#[derive(Default)]
pub struct MemoryLetterStore {
    published: Mutex<Vec<SanctionTerms>>,
    fail_next: Mutex<bool>,
    fixed_locator: Mutex<Option<String>>,
}

impl MemoryLetterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<SanctionTerms> {
        self.published.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// Return this locator for every letter instead of a numbered one
    pub fn reuse_locator(&self, locator: &str) {
        *self.fixed_locator.lock().unwrap() = Some(locator.to_string());
    }
}

#[async_trait]
impl LetterStore for MemoryLetterStore {
    async fn publish(&self, terms: &SanctionTerms) -> Result<String, LetterError> {
        if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
            return Err(LetterError::Io(std::io::Error::other("disk full")));
        }
        let mut published = self.published.lock().unwrap();
        published.push(terms.clone());
        let locator = self
            .fixed_locator
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("/letters/letter-{}.pdf", published.len()));
        Ok(locator)
    }
}
