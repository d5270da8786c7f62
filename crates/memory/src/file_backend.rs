//! File-based conversation store: one pretty-printed JSON array per file.
//!
//! Format: `[{"role": "system", "content": "..."}, {"role": "user", ...}]`.
//!
//! The file is read in full at startup and overwritten in full on save.
//! There is no append path, so turns since the last save are lost on a crash.

use ferrule_core::error::MemoryError;
use ferrule_core::message::Conversation;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A conversation transcript stored as a JSON file.
#[derive(Debug, Clone)]
pub struct ConversationFile {
    path: PathBuf,
}

impl ConversationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored transcript.
    ///
    /// A missing file is not an error: it yields `Ok(None)` so the caller
    /// starts fresh. An unreadable or malformed file is an error.
    pub fn load(&self) -> Result<Option<Conversation>, MemoryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved conversation, starting fresh");
                return Ok(None);
            }
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read conversation file {}: {e}",
                    self.path.display()
                )));
            }
        };

        let conversation: Conversation =
            serde_json::from_str(&content).map_err(|e| MemoryError::Corrupted {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            path = %self.path.display(),
            messages = conversation.len(),
            "Conversation loaded"
        );
        Ok(Some(conversation))
    }

    /// Overwrite the file with the full transcript.
    pub fn save(&self, conversation: &Conversation) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create conversation directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(conversation).map_err(|e| {
            MemoryError::Storage(format!("Failed to serialize conversation: {e}"))
        })?;

        std::fs::write(&self.path, content).map_err(|e| {
            MemoryError::Storage(format!("Failed to write conversation file: {e}"))
        })?;

        debug!(
            path = %self.path.display(),
            messages = conversation.len(),
            "Conversation saved"
        );
        Ok(())
    }
}
