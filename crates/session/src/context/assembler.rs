//! Context-budget assembler.
//!
//! Fits the system prompt, the whole document, a window of recent turns and
//! the current query under a hard token ceiling. Only history is ever
//! degraded: turns are dropped one at a time, oldest first, and the full
//! payload is re-counted by the oracle after each drop. When even the
//! zero-history payload is over the ceiling the result is a
//! [`TooLargeReport`], never a truncated document.
//!
//! The assembler is stateless; one instance can serve any number of
//! sequential or concurrent calls.

use crate::context::render::{render_payload, render_preamble};
use docchat_core::error::OracleError;
use docchat_core::oracle::TokenOracle;
use docchat_core::turn::Turn;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ── Types ─────────────────────────────────────────────────────────────────

/// Token ceiling for one assembled payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// The endpoint's maximum input tokens.
    pub max_tokens: usize,
    /// Tokens held back from `max_tokens` (e.g. for the reply).
    pub reserved_headroom: usize,
}

impl Budget {
    pub const DEFAULT_MAX_TOKENS: usize = 1_000_000;

    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            reserved_headroom: 0,
        }
    }

    pub fn with_headroom(mut self, reserved_headroom: usize) -> Self {
        self.reserved_headroom = reserved_headroom;
        self
    }

    /// The ceiling a payload must not exceed.
    pub fn ceiling(&self) -> usize {
        self.max_tokens.saturating_sub(self.reserved_headroom)
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_TOKENS)
    }
}

/// Everything the assembler needs for one call.
pub struct AssemblyInput<'a> {
    /// Full document text; empty when no document is loaded.
    pub document: &'a str,
    /// Cached document token count, used for diagnostics only.
    pub document_tokens: Option<usize>,
    /// Prior turns, oldest first.
    pub history: &'a [Turn],
    /// Active system prompt; may be empty.
    pub system_prompt: &'a str,
    /// The new user query. Callers reject empty queries before assembly.
    pub query: &'a str,
}

/// Outcome of an assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyResult {
    /// The payload is within budget.
    Fits {
        payload: String,
        /// Number of most recent turns kept.
        turns_included: usize,
        /// Oracle count of `payload`.
        total_tokens: usize,
    },
    /// Not even the zero-history payload fits.
    TooLarge(TooLargeReport),
}

impl AssemblyResult {
    pub fn fits(&self) -> bool {
        matches!(self, Self::Fits { .. })
    }
}

/// Token measurements explaining why nothing fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooLargeReport {
    pub document_tokens: usize,
    pub system_tokens: usize,
    pub query_tokens: usize,
    /// Count of the zero-history payload (preamble + query).
    pub minimum_possible: usize,
    /// The ceiling that was exceeded.
    pub budget: usize,
}

/// What pushed the payload over the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooLargeCause {
    /// The document on its own is over the ceiling.
    DocumentAlone,
    /// The document fits alone but not with the prompt and query added.
    DocumentWithQuery,
}

impl TooLargeReport {
    pub fn cause(&self) -> TooLargeCause {
        if self.document_tokens > self.budget {
            TooLargeCause::DocumentAlone
        } else {
            TooLargeCause::DocumentWithQuery
        }
    }

    /// Tokens over the ceiling at the smallest possible payload.
    pub fn overflow(&self) -> usize {
        self.minimum_possible.saturating_sub(self.budget)
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// The context assembler. Stateless; create one and reuse it.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    budget: Budget,
}

impl ContextAssembler {
    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Assemble the largest payload that fits.
    ///
    /// # Algorithm
    ///
    /// 1. Render the preamble (system prompt, then document)
    /// 2. Render preamble + history view + query and count it
    /// 3. Within the ceiling → `Fits` with the current view
    /// 4. Over the ceiling with a non-empty view → drop the oldest turn, go to 2
    /// 5. Over the ceiling with an empty view → `TooLarge`
    ///
    /// At most `history.len() + 1` counts are made before `Fits`. The
    /// `TooLarge` path adds up to three diagnostic counts. Oracle errors are
    /// returned unchanged.
    pub async fn assemble(
        &self,
        input: &AssemblyInput<'_>,
        oracle: &dyn TokenOracle,
    ) -> Result<AssemblyResult, OracleError> {
        let ceiling = self.budget.ceiling();
        let preamble = render_preamble(input.system_prompt, input.document);
        let history = input.history;

        let mut dropped = 0;
        let minimum_possible = loop {
            let view = &history[dropped..];
            let payload = render_payload(&preamble, view, input.query);
            let total_tokens = oracle.count(&payload).await?;

            debug!(
                turns = view.len(),
                tokens = total_tokens,
                ceiling,
                "Counted candidate payload"
            );

            if total_tokens <= ceiling {
                info!(
                    turns_included = view.len(),
                    turns_evicted = dropped,
                    tokens = total_tokens,
                    ceiling,
                    "Payload fits"
                );
                return Ok(AssemblyResult::Fits {
                    payload,
                    turns_included: view.len(),
                    total_tokens,
                });
            }

            if view.is_empty() {
                // The zero-history render is preamble + query.
                break total_tokens;
            }
            dropped += 1;
        };

        let document_tokens = match input.document_tokens {
            _ if input.document.is_empty() => 0,
            Some(tokens) => tokens,
            None => oracle.count(input.document).await?,
        };
        let system_tokens = count_section(oracle, input.system_prompt).await?;
        let query_tokens = count_section(oracle, input.query).await?;

        let report = TooLargeReport {
            document_tokens,
            system_tokens,
            query_tokens,
            minimum_possible,
            budget: ceiling,
        };

        warn!(
            document_tokens,
            system_tokens,
            query_tokens,
            minimum_possible,
            ceiling,
            "Payload exceeds budget even without history"
        );

        Ok(AssemblyResult::TooLarge(report))
    }
}

async fn count_section(oracle: &dyn TokenOracle, text: &str) -> Result<usize, OracleError> {
    if text.trim().is_empty() {
        Ok(0)
    } else {
        oracle.count(text).await
    }
}
