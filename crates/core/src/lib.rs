//! # DocChat Core
//!
//! Domain types, traits, and error definitions for DocChat.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that the other crates implement against.
//!
//! ## Design Philosophy
//!
//! The one external collaborator, the token oracle, is defined as a trait here.
//! Implementations live in `docchat-providers`. This enables:
//! - Swapping the model backend via configuration
//! - Easy testing with scripted oracles
//! - Clean dependency graph (all crates depend inward on core)

pub mod document;
pub mod error;
pub mod oracle;
pub mod prompt;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use document::Document;
pub use error::{IngestError, OracleError};
pub use oracle::TokenOracle;
pub use prompt::SystemPrompt;
pub use turn::{History, Role, Turn};
