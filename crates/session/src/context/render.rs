//! Payload rendering.
//!
//! Layout, with empty sections omitted:
//!
//! ```text
//! System Prompt:
//! ---
//! <system prompt>
//! ---
//!
//! Document Content:
//! ---
//! <document>
//! ---
//!
//! Chat History:
//! ---
//! User: ...
//! Assistant: ...
//! ---
//!
//! User Question: <query>
//! ```
//!
//! The document text is inserted verbatim.

use docchat_core::turn::Turn;
use std::fmt::Write;

const FENCE: &str = "---";

fn push_section(out: &mut String, header: &str, body: &str) {
    // Writing to a String cannot fail.
    let _ = write!(out, "{header}\n{FENCE}\n{body}\n{FENCE}\n\n");
}

/// Render the fixed part of every payload: system prompt, then document.
pub fn render_preamble(system_prompt: &str, document: &str) -> String {
    let mut out = String::with_capacity(system_prompt.len() + document.len() + 64);
    if !system_prompt.trim().is_empty() {
        push_section(&mut out, "System Prompt:", system_prompt);
    }
    if !document.is_empty() {
        push_section(&mut out, "Document Content:", document);
    }
    out
}

/// Render turns as `Role: content` lines.
pub fn render_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role().label(), t.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the full payload for one oracle call.
pub fn render_payload(preamble: &str, turns: &[Turn], query: &str) -> String {
    let mut out = String::with_capacity(preamble.len() + query.len() + 64);
    out.push_str(preamble);
    if !turns.is_empty() {
        push_section(&mut out, "Chat History:", &render_history(turns));
    }
    let _ = write!(out, "User Question: {query}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_are_omitted() {
        let preamble = render_preamble("", "");
        assert!(preamble.is_empty());
        assert_eq!(render_payload(&preamble, &[], "hi?"), "User Question: hi?");
    }

    #[test]
    fn sections_appear_in_order() {
        let preamble = render_preamble("Be brief.", "The cat sat.");
        let turns = vec![Turn::user("Who sat?"), Turn::assistant("The cat.")];
        let payload = render_payload(&preamble, &turns, "Where?");

        let system = payload.find("System Prompt:").unwrap();
        let document = payload.find("Document Content:").unwrap();
        let history = payload.find("Chat History:").unwrap();
        let question = payload.find("User Question: Where?").unwrap();
        assert!(system < document && document < history && history < question);

        assert!(payload.contains("User: Who sat?\nAssistant: The cat."));
        assert!(payload.ends_with("User Question: Where?"));
    }

    #[test]
    fn document_is_inserted_verbatim() {
        let document = "  leading spaces\n\n---\ntrailing  \n";
        let preamble = render_preamble("", document);
        assert!(preamble.contains(document));
    }

    #[test]
    fn whitespace_only_system_prompt_is_omitted() {
        let preamble = render_preamble("   \n", "doc");
        assert!(!preamble.contains("System Prompt:"));
        assert!(preamble.starts_with("Document Content:"));
    }
}
