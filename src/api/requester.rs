//! Requester identity
//!
//! The identity proxy in front of the service authenticates the caller and
//! forwards their ID in a header; it is trusted as-is.

use super::handlers::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

pub const REQUESTER_HEADER: &str = "x-requester-id";

/// The caller's identity, taken from [`REQUESTER_HEADER`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(REQUESTER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Requester(value.to_string()))
            .ok_or_else(|| AppError::Unauthorized(format!("Missing {REQUESTER_HEADER} header")))
    }
}
