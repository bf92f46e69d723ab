//! Offline token estimation.
//!
//! Uses a character-based heuristic: ~4 bytes per token, rounded up.
//! Good enough for dry-run size checks without a network round trip;
//! never a substitute for the model's own tokenizer when generating.

use async_trait::async_trait;
use docchat_core::error::OracleError;
use docchat_core::oracle::TokenOracle;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

/// An oracle that counts with [`estimate_tokens`] and cannot generate.
#[derive(Debug, Default, Clone, Copy)]
pub struct EstimatingOracle;

impl EstimatingOracle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenOracle for EstimatingOracle {
    fn name(&self) -> &str {
        "estimate"
    }

    async fn count(&self, text: &str) -> Result<usize, OracleError> {
        Ok(estimate_tokens(text))
    }

    async fn generate(&self, _text: &str) -> Result<String, OracleError> {
        Err(OracleError::NotConfigured(
            "the 'estimate' provider only counts tokens; configure provider = \"gemini\" to chat"
                .into(),
        ))
    }
}
