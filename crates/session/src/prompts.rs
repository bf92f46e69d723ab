//! Named system-prompt library, persisted as a JSON array.
//!
//! Storage location: `~/.docchat/prompts.json` unless configured otherwise.
//! The file is rewritten on every mutation. Two built-in prompts are always
//! present and cannot be deleted.

use docchat_core::prompt::SystemPrompt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_GENERAL_ID: &str = "default-general";
pub const DEFAULT_SUMMARY_ID: &str = "default-summary";

const FALLBACK_PROMPT: &str = "You are a helpful assistant analyzing the provided document.";

/// The built-in prompts seeded into every library.
pub fn builtin_prompts() -> Vec<SystemPrompt> {
    vec![
        SystemPrompt::new(
            DEFAULT_GENERAL_ID,
            "Default (General Assistant)",
            "You are a helpful assistant analyzing the provided document. Answer the user's questions based on the document content.",
        ),
        SystemPrompt::new(
            DEFAULT_SUMMARY_ID,
            "Default (Summarizer)",
            "You are an expert summarizer. Based on the provided document, summarize the key points in response to the user's request.",
        ),
    ]
}

fn is_builtin(id: &str) -> bool {
    id == DEFAULT_GENERAL_ID || id == DEFAULT_SUMMARY_ID
}

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Prompt {0} cannot be empty")]
    EmptyField(&'static str),

    #[error("A prompt named '{0}' already exists")]
    DuplicateName(String),

    #[error("Built-in prompt '{0}' cannot be deleted")]
    BuiltIn(String),

    #[error("No prompt with id '{0}'")]
    NotFound(String),

    #[error("Prompt storage error at {path}: {reason}")]
    Storage { path: PathBuf, reason: String },
}

/// A file-backed collection of [`SystemPrompt`]s.
pub struct PromptLibrary {
    path: PathBuf,
    prompts: Vec<SystemPrompt>,
}

impl PromptLibrary {
    /// Open the library at `path`, creating or repairing the file as needed.
    ///
    /// - missing file: written with the built-ins
    /// - file without `default-general`: built-ins merged in and saved
    /// - unparseable file: replaced with the built-ins
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PromptError> {
        let path = path.into();

        let (prompts, dirty) = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Creating prompt library with defaults");
                (builtin_prompts(), true)
            }
            Err(e) => return Err(storage_error(&path, e)),
            Ok(content) => match serde_json::from_str::<Vec<SystemPrompt>>(&content) {
                Ok(mut prompts) => {
                    if prompts.iter().any(|p| p.id == DEFAULT_GENERAL_ID) {
                        (prompts, false)
                    } else {
                        info!(path = %path.display(), "Merging built-in prompts into library");
                        for builtin in builtin_prompts() {
                            if !prompts.iter().any(|p| p.id == builtin.id) {
                                prompts.push(builtin);
                            }
                        }
                        (prompts, true)
                    }
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Prompt library corrupted, restoring defaults"
                    );
                    (builtin_prompts(), true)
                }
            },
        };

        let library = Self { path, prompts };
        if dirty {
            library.save()?;
        }
        debug!(
            path = %library.path.display(),
            count = library.prompts.len(),
            "Prompt library loaded"
        );
        Ok(library)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> &[SystemPrompt] {
        &self.prompts
    }

    pub fn get(&self, id: &str) -> Option<&SystemPrompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&SystemPrompt> {
        let name = name.trim().to_lowercase();
        self.prompts.iter().find(|p| p.name.to_lowercase() == name)
    }

    /// Look up by id first, then by name.
    pub fn resolve(&self, id_or_name: &str) -> Option<&SystemPrompt> {
        self.get(id_or_name).or_else(|| self.find_by_name(id_or_name))
    }

    /// Text of the general built-in prompt.
    pub fn default_prompt(&self) -> &str {
        self.get(DEFAULT_GENERAL_ID).map_or(FALLBACK_PROMPT, |p| p.text.as_str())
    }

    /// Add a user prompt and persist the library.
    pub fn add(&mut self, name: &str, text: &str) -> Result<&SystemPrompt, PromptError> {
        let name = name.trim();
        let text = text.trim();
        if name.is_empty() {
            return Err(PromptError::EmptyField("name"));
        }
        if text.is_empty() {
            return Err(PromptError::EmptyField("text"));
        }
        if self.find_by_name(name).is_some() {
            return Err(PromptError::DuplicateName(name.to_string()));
        }

        let prompt = SystemPrompt::new(Uuid::new_v4().to_string(), name, text);
        info!(id = %prompt.id, name = %prompt.name, "Prompt added");
        self.prompts.push(prompt);

        if let Err(e) = self.save() {
            self.prompts.pop();
            return Err(e);
        }
        Ok(&self.prompts[self.prompts.len() - 1])
    }

    /// Delete a user prompt and persist the library.
    pub fn delete(&mut self, id: &str) -> Result<SystemPrompt, PromptError> {
        if is_builtin(id) {
            return Err(PromptError::BuiltIn(id.to_string()));
        }
        let index = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PromptError::NotFound(id.to_string()))?;

        let removed = self.prompts.remove(index);
        if let Err(e) = self.save() {
            self.prompts.insert(index, removed);
            return Err(e);
        }
        info!(id = %removed.id, name = %removed.name, "Prompt deleted");
        Ok(removed)
    }

    fn save(&self) -> Result<(), PromptError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error(&self.path, e))?;
        }
        let json =
            serde_json::to_string_pretty(&self.prompts).map_err(|e| PromptError::Storage {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        std::fs::write(&self.path, json).map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> PromptError {
    PromptError::Storage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("prompts.json")
    }

    #[test]
    fn missing_file_seeded_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = library_path(&dir);

        let library = PromptLibrary::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(library.list().len(), 2);
        assert!(library.default_prompt().starts_with("You are a helpful assistant"));
        assert!(library.get(DEFAULT_SUMMARY_ID).is_some());
    }

    #[test]
    fn nested_directory_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("prompts.json");

        PromptLibrary::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn add_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = library_path(&dir);

        let id = {
            let mut library = PromptLibrary::open(&path).unwrap();
            let prompt = library.add("  Legal Review ", " Flag risky clauses. ").unwrap();
            assert_eq!(prompt.name, "Legal Review");
            assert_eq!(prompt.text, "Flag risky clauses.");
            prompt.id.clone()
        };

        let library = PromptLibrary::open(&path).unwrap();
        assert_eq!(library.list().len(), 3);
        assert_eq!(library.get(&id).unwrap().name, "Legal Review");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn duplicate_names_rejected_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = PromptLibrary::open(library_path(&dir)).unwrap();

        let err = library.add("default (summarizer)", "x").unwrap_err();
        assert!(matches!(err, PromptError::DuplicateName(_)));
    }

    #[test]
    fn empty_fields_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = PromptLibrary::open(library_path(&dir)).unwrap();

        assert!(matches!(
            library.add("  ", "text"),
            Err(PromptError::EmptyField("name"))
        ));
        assert!(matches!(
            library.add("Name", "\n"),
            Err(PromptError::EmptyField("text"))
        ));
        assert_eq!(library.list().len(), 2);
    }

    #[test]
    fn builtins_cannot_be_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let mut library = PromptLibrary::open(library_path(&dir)).unwrap();

        let err = library.delete(DEFAULT_GENERAL_ID).unwrap_err();
        assert!(matches!(err, PromptError::BuiltIn(_)));
        assert!(matches!(
            library.delete("no-such-id"),
            Err(PromptError::NotFound(_))
        ));
    }

    #[test]
    fn delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = library_path(&dir);
        let mut library = PromptLibrary::open(&path).unwrap();
        let id = library.add("Temp", "Temporary.").unwrap().id.clone();

        let removed = library.delete(&id).unwrap();
        assert_eq!(removed.name, "Temp");

        let reopened = PromptLibrary::open(&path).unwrap();
        assert!(reopened.get(&id).is_none());
        assert_eq!(reopened.list().len(), 2);
    }

    #[test]
    fn corrupted_file_restored_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = library_path(&dir);
        std::fs::write(&path, "{ not json").unwrap();

        let library = PromptLibrary::open(&path).unwrap();
        assert_eq!(library.list().len(), 2);

        let on_disk: Vec<SystemPrompt> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 2);
    }

    #[test]
    fn missing_general_default_merged_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = library_path(&dir);
        let custom = vec![SystemPrompt::new("abc", "Custom", "Be custom.")];
        std::fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();

        let library = PromptLibrary::open(&path).unwrap();

        assert_eq!(library.list().len(), 3);
        assert_eq!(library.list()[0].id, "abc");
        assert!(library.get(DEFAULT_GENERAL_ID).is_some());
    }

    #[test]
    fn resolve_by_id_or_name() {
        let dir = tempfile::tempdir().unwrap();
        let library = PromptLibrary::open(library_path(&dir)).unwrap();

        assert_eq!(
            library.resolve(DEFAULT_SUMMARY_ID).unwrap().name,
            "Default (Summarizer)"
        );
        assert_eq!(
            library.resolve("DEFAULT (GENERAL ASSISTANT)").unwrap().id,
            DEFAULT_GENERAL_ID
        );
        assert!(library.resolve("nothing").is_none());
    }
}
