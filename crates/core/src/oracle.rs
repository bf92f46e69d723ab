//! Token oracle trait — the abstraction over the language-model endpoint.
//!
//! The oracle does two things: counts tokens under a model-specific tokenizer
//! and generates a completion for a prompt. Both are treated as opaque,
//! possibly failing, possibly billable round trips.
//!
//! Implementations: Gemini (`docchat-providers`), an offline estimator, and
//! scripted oracles in tests.

use async_trait::async_trait;
use crate::error::OracleError;

/// The external token-counting / generation service.
///
/// The assembler only ever calls [`count`](TokenOracle::count); the session
/// controller calls [`generate`](TokenOracle::generate) once a payload fits.
#[async_trait]
pub trait TokenOracle: Send + Sync {
    /// A human-readable name for this oracle (e.g., "gemini", "estimate").
    fn name(&self) -> &str;

    /// Count the tokens of `text` under this oracle's tokenizer.
    async fn count(&self, text: &str) -> std::result::Result<usize, OracleError>;

    /// Generate a completion for `text`.
    async fn generate(&self, text: &str) -> std::result::Result<String, OracleError>;

    /// Health check — can we reach the oracle with the configured credentials?
    async fn health_check(&self) -> std::result::Result<bool, OracleError> {
        Ok(true)
    }
}
