//! The loaded document.

use serde::{Deserialize, Serialize};

/// Plain text placed in full into every request of a session.
///
/// The token count is measured once, when the document is loaded, and
/// cached here. The text is never partially mutated; a new upload replaces
/// the whole value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    name: String,
    text: String,
    token_count: usize,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>, token_count: usize) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            token_count,
        }
    }

    /// Display name (usually the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Token count measured at load time.
    pub fn token_count(&self) -> usize {
        self.token_count
    }
}
