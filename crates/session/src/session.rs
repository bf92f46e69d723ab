//! The chat session controller.
//!
//! Owns the loaded document, the turn history and the active system prompt
//! for one conversation. Each [`Session::ask`] assembles a payload, sends it
//! to the oracle and records the exchange only once a reply is in hand.

use crate::context::{AssemblyInput, AssemblyResult, Budget, ContextAssembler, TooLargeReport};
use docchat_core::document::Document;
use docchat_core::error::OracleError;
use docchat_core::oracle::TokenOracle;
use docchat_core::turn::{History, Turn};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one successful `ask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The oracle answered; the exchange was appended to history.
    Answered {
        response: String,
        turns_included: usize,
        prompt_tokens: usize,
    },
    /// Nothing fits; history is unchanged.
    TooLarge(TooLargeReport),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Document '{name}' is {tokens} tokens, over the {budget} token budget")]
    DocumentTooLarge {
        name: String,
        tokens: usize,
        budget: usize,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// One conversation about (at most) one document.
pub struct Session {
    oracle: Arc<dyn TokenOracle>,
    assembler: ContextAssembler,
    document: Option<Document>,
    history: History,
    system_prompt: String,
    max_history_turns: Option<usize>,
}

impl Session {
    pub fn new(oracle: Arc<dyn TokenOracle>, budget: Budget) -> Self {
        Self {
            oracle,
            assembler: ContextAssembler::new(budget),
            document: None,
            history: History::new(),
            system_prompt: String::new(),
            max_history_turns: None,
        }
    }

    pub fn with_system_prompt(mut self, text: impl Into<String>) -> Self {
        self.system_prompt = text.into();
        self
    }

    /// Offer at most the `max` most recent turns to the assembler.
    pub fn with_max_history_turns(mut self, max: Option<usize>) -> Self {
        self.max_history_turns = max;
        self
    }

    /// Count and load a document, replacing the current one.
    ///
    /// A successful load starts a fresh history. On failure the session is
    /// left exactly as it was.
    pub async fn load_document(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<&Document, SessionError> {
        let name = name.into();
        let text = text.into();

        let tokens = if text.is_empty() {
            0
        } else {
            self.oracle.count(&text).await?
        };
        let budget = self.assembler.budget().ceiling();

        if tokens > budget {
            warn!(document = %name, tokens, budget, "Document rejected: over budget");
            return Err(SessionError::DocumentTooLarge {
                name,
                tokens,
                budget,
            });
        }

        info!(document = %name, tokens, budget, "Document loaded");
        self.history = History::new();
        Ok(&*self.document.insert(Document::new(name, text, tokens)))
    }

    /// Drop the document and the history.
    pub fn unload_document(&mut self) {
        self.document = None;
        self.history = History::new();
    }

    pub fn set_system_prompt(&mut self, text: impl Into<String>) {
        self.system_prompt = text.into();
    }

    /// Answer `query` against the document and recent history.
    pub async fn ask(&mut self, query: &str) -> Result<TurnOutcome, SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        let view = match self.max_history_turns {
            Some(max) => self.history.suffix(max),
            None => self.history.turns(),
        };

        let input = AssemblyInput {
            document: self.document.as_ref().map_or("", |d| d.text()),
            document_tokens: self.document.as_ref().map(|d| d.token_count()),
            history: view,
            system_prompt: &self.system_prompt,
            query,
        };

        let (payload, turns_included, prompt_tokens) =
            match self.assembler.assemble(&input, self.oracle.as_ref()).await? {
                AssemblyResult::Fits {
                    payload,
                    turns_included,
                    total_tokens,
                } => (payload, turns_included, total_tokens),
                AssemblyResult::TooLarge(report) => return Ok(TurnOutcome::TooLarge(report)),
            };

        debug!(oracle = self.oracle.name(), prompt_tokens, "Generating response");
        let response = self.oracle.generate(&payload).await?;

        self.history.append(Turn::user(query));
        self.history.append(Turn::assistant(response.clone()));

        Ok(TurnOutcome::Answered {
            response,
            turns_included,
            prompt_tokens,
        })
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn budget(&self) -> Budget {
        self.assembler.budget()
    }
}
