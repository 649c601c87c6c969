//! Static JSON fixture keyed by identifier

use super::{
    ineligible_message, not_found_message, EligibilityState, VerificationError,
    VerificationLookup, VerificationRecord,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const BUNDLED_FIXTURE: &str = include_str!("../../fixtures/verification_records.json");

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read verification fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid verification fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureEntry {
    full_name: String,
    credit_score: u32,
    status: String,
}

impl FixtureEntry {
    fn eligibility(&self) -> EligibilityState {
        match self.status.as_str() {
            "approved" | "eligible" => EligibilityState::Eligible,
            "rejected_high_risk" => EligibilityState::IneligibleRisk,
            _ => EligibilityState::Unknown,
        }
    }
}

/// Mock KYC/credit bureau backed by an in-memory map
#[derive(Debug, Clone)]
pub struct FixtureVerification {
    entries: HashMap<String, FixtureEntry>,
}

impl FixtureVerification {
    /// Records shipped with the binary
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::from_json(BUNDLED_FIXTURE)
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let entries: HashMap<String, FixtureEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl VerificationLookup for FixtureVerification {
    async fn lookup(&self, subject_id: &str) -> Result<VerificationRecord, VerificationError> {
        tracing::info!(subject_id, "Running KYC and credit check");

        let Some(entry) = self.entries.get(subject_id) else {
            tracing::info!(subject_id, "KYC failed: no record");
            return Err(VerificationError::not_found(
                subject_id,
                not_found_message(subject_id),
            ));
        };

        let eligibility = entry.eligibility();
        if eligibility == EligibilityState::IneligibleRisk {
            tracing::info!(subject_id, "KYC failed: high risk profile");
            return Err(VerificationError::ineligible(
                subject_id,
                ineligible_message(&entry.full_name),
            ));
        }

        tracing::info!(subject_id, score = entry.credit_score, ?eligibility, "KYC succeeded");
        Ok(VerificationRecord {
            subject_id: subject_id.to_string(),
            display_name: entry.full_name.clone(),
            score: entry.credit_score,
            eligibility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bundled_fixture_finds_known_subject() {
        let fixture = FixtureVerification::bundled().unwrap();
        assert_eq!(fixture.len(), 5);

        let record = fixture.lookup("ABCDE1234F").await.unwrap();
        assert_eq!(record.display_name, "Asha Rao");
        assert_eq!(record.score, 750);
        assert_eq!(record.eligibility, EligibilityState::Eligible);
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_not_found_with_message() {
        let fixture = FixtureVerification::bundled().unwrap();
        let err = fixture.lookup("ZZZZZ0000Z").await.unwrap_err();
        assert!(matches!(err, VerificationError::NotFound { .. }));
        assert!(err.rejection_message().unwrap().contains("ZZZZZ0000Z"));
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let fixture = FixtureVerification::bundled().unwrap();
        assert!(fixture.lookup("abcde1234f").await.is_err());
    }

    #[tokio::test]
    async fn test_high_risk_is_ineligible() {
        let fixture = FixtureVerification::bundled().unwrap();
        let err = fixture.lookup("PQRST3456U").await.unwrap_err();
        assert!(matches!(err, VerificationError::Ineligible { .. }));
        assert_eq!(
            err.rejection_message(),
            Some("Sorry, Vikram Mehta, we are unable to approve a loan for your profile at this time.")
        );
    }

    #[tokio::test]
    async fn test_unrecognized_status_is_unknown_not_rejected() {
        let fixture = FixtureVerification::bundled().unwrap();
        let record = fixture.lookup("UVWXY7890Z").await.unwrap();
        assert_eq!(record.eligibility, EligibilityState::Unknown);
    }

    #[test]
    fn test_from_json_rejects_malformed_fixture() {
        assert!(matches!(
            FixtureVerification::from_json(r#"{"X": {"fullName": "A"}}"#),
            Err(FixtureError::Parse(_))
        ));
    }

    #[test]
    fn test_from_path_reports_missing_file() {
        let err = FixtureVerification::from_path("/nonexistent/fixture.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fixture.json"));
    }
}
