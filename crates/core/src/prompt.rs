//! Named system prompts.

use serde::{Deserialize, Serialize};

/// A reusable system prompt selected by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPrompt {
    /// Stable identifier ("default-general", or a UUID for user prompts)
    pub id: String,

    /// Display name, unique case-insensitively within a library
    pub name: String,

    /// The instruction text sent ahead of the document
    pub text: String,
}

impl SystemPrompt {
    pub fn new(id: impl Into<String>, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            text: text.into(),
        }
    }
}
