//! DocChat session layer.
//!
//! - [`context`]: fits document, system prompt, history and query under a
//!   token budget, evicting history oldest-first
//! - [`session`]: the per-conversation controller
//! - [`prompts`]: the named system-prompt library
//! - [`ingest`]: text extraction from plain-text, PDF and Word files

pub mod context;
pub mod ingest;
pub mod prompts;
pub mod session;

pub use context::{
    AssemblyInput, AssemblyResult, Budget, ContextAssembler, TooLargeCause, TooLargeReport,
};
pub use ingest::{ExtractedDocument, extract_text};
pub use prompts::{PromptError, PromptLibrary};
pub use session::{Session, SessionError, TurnOutcome};
