//! Error types shared across DocChat crates.
//!
//! Uses `thiserror` for ergonomic error definitions. Crates with their own
//! failure modes (config, session, prompts) define their own enums.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the token oracle (`count` or `generate`).
///
/// Every variant except [`OracleError::ContentPolicyRejected`] means the
/// oracle is unavailable for this call. None of them are retried.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Oracle not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Content rejected by policy: {0}")]
    ContentPolicyRejected(String),
}

impl OracleError {
    /// Whether this is a transient unavailability (network, auth, quota)
    /// rather than a rejection of the content itself.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::ContentPolicyRejected(_))
    }
}

/// Failures turning an uploaded file into plain text.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Error processing file '{path}': {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },
}
