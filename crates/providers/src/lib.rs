//! Token oracle implementations for DocChat.
//!
//! All oracles implement the `docchat_core::TokenOracle` trait.
//! The router selects the correct oracle based on configuration.

pub mod estimate;
pub mod gemini;
pub mod router;

pub use estimate::{EstimatingOracle, estimate_tokens};
pub use gemini::GeminiOracle;
pub use router::build_from_config;
