//! Verification lookup collaborator
//!
//! Checks a requester-supplied identifier against an eligibility source.
//! The turn processor only sees the [`VerificationLookup`] trait so the
//! backing store can be swapped without touching it.

mod fixture;

pub use fixture::FixtureVerification;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Eligibility as reported by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityState {
    Eligible,
    IneligibleRisk,
    Unknown,
}

/// Result of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    pub subject_id: String,
    pub display_name: String,
    pub score: u32,
    pub eligibility: EligibilityState,
}

/// Lookup failures. `NotFound` and `Ineligible` carry requester-facing text.
#[derive(Debug, Clone, Error)]
pub enum VerificationError {
    #[error("{message}")]
    NotFound { subject_id: String, message: String },

    #[error("{message}")]
    Ineligible { subject_id: String, message: String },

    #[error("verification backend failed: {0}")]
    Backend(String),
}

impl VerificationError {
    pub fn not_found(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            subject_id: subject_id.into(),
            message: message.into(),
        }
    }

    pub fn ineligible(subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ineligible {
            subject_id: subject_id.into(),
            message: message.into(),
        }
    }

    /// Requester-facing explanation, for the two business outcomes
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::NotFound { message, .. } | Self::Ineligible { message, .. } => Some(message),
            Self::Backend(_) => None,
        }
    }
}

/// Eligibility source keyed by subject identifier
#[async_trait]
pub trait VerificationLookup: Send + Sync {
    async fn lookup(&self, subject_id: &str) -> Result<VerificationRecord, VerificationError>;
}

#[async_trait]
impl<T: VerificationLookup + ?Sized> VerificationLookup for Arc<T> {
    async fn lookup(&self, subject_id: &str) -> Result<VerificationRecord, VerificationError> {
        (**self).lookup(subject_id).await
    }
}

/// Rejection text for an ineligible subject
pub fn ineligible_message(display_name: &str) -> String {
    format!(
        "Sorry, {display_name}, we are unable to approve a loan for your profile at this time."
    )
}

/// Rejection text for an unknown identifier
pub fn not_found_message(subject_id: &str) -> String {
    format!(
        "Sorry, we couldn't find a record for the PAN: {subject_id}. Please check the number and try again."
    )
}
