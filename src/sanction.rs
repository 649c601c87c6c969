//! Sanction letter persistence
//!
//! Given computed terms, produce the fixed-layout sanction letter and return
//! a locator the requester can download it from.

mod fs_store;
mod letter;

pub use fs_store::FsLetterStore;
pub use letter::render_letter;

use crate::dialogue::SanctionTerms;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LetterError {
    #[error("Failed to render sanction letter: {0}")]
    Render(String),
    #[error("Failed to store sanction letter: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores sanction letters and hands back their locators
#[async_trait]
pub trait LetterStore: Send + Sync {
    async fn publish(&self, terms: &SanctionTerms) -> Result<String, LetterError>;
}

#[async_trait]
impl<T: LetterStore + ?Sized> LetterStore for Arc<T> {
    async fn publish(&self, terms: &SanctionTerms) -> Result<String, LetterError> {
        (**self).publish(terms).await
    }
}
