//! Letters written to a local directory and served over HTTP

use super::{render_letter, LetterError, LetterStore};
use crate::dialogue::SanctionTerms;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Writes letters under `dir`; locators are `{url_prefix}/{file_name}`
#[derive(Debug, Clone)]
pub struct FsLetterStore {
    dir: PathBuf,
    url_prefix: String,
}

impl FsLetterStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Give up after this many same-millisecond collisions
const MAX_NAME_ATTEMPTS: u32 = 100;

/// `Sanction_Letter_{Name_With_Underscores}_{unix_millis}.pdf`, with `_{n}`
/// before the extension for the n-th retry.
///
/// The subject name may come from the requester, so anything that is not
/// alphanumeric, `-` or `_` is dropped.
fn letter_file_name(subject_name: &str, millis: i64, attempt: u32) -> String {
    let cleaned: String = subject_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let stem = if cleaned.is_empty() { "Customer" } else { &cleaned };
    if attempt == 0 {
        format!("Sanction_Letter_{stem}_{millis}.pdf")
    } else {
        format!("Sanction_Letter_{stem}_{millis}_{attempt}.pdf")
    }
}

impl FsLetterStore {
    /// Write `bytes` under a file name no other letter holds; returns the name
    async fn write_new(
        &self,
        subject_name: &str,
        millis: i64,
        bytes: &[u8],
    ) -> Result<String, LetterError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = letter_file_name(subject_name, millis, attempt);
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&file_name))
                .await;
            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(file_name);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }

        Err(LetterError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free letter file name for {subject_name} at {millis}"),
        )))
    }
}

#[async_trait]
impl LetterStore for FsLetterStore {
    async fn publish(&self, terms: &SanctionTerms) -> Result<String, LetterError> {
        let bytes = render_letter(terms)?;
        let file_name = self
            .write_new(&terms.subject_name, Utc::now().timestamp_millis(), &bytes)
            .await?;

        let locator = format!("{}/{file_name}", self.url_prefix);
        tracing::info!(subject = %terms.subject_name, locator = %locator, "Generated sanction letter");
        Ok(locator)
    }
}
