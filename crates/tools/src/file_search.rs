//! File search tool: find files whose name contains a search term.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ferrule_core::error::ToolError;
use ferrule_core::tool::Tool;
use tracing::debug;
use walkdir::WalkDir;

pub struct FileSearchTool {
    /// Directory the walk starts from (included in the results if it matches).
    pub root: PathBuf,
}

impl FileSearchTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk `root` and collect every path whose final component contains
    /// `term`, case-insensitively. The first walk error aborts the search.
    fn search(root: &Path, term: &str) -> Result<Vec<PathBuf>, walkdir::Error> {
        let needle = term.to_lowercase();
        let mut matches = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.contains(&needle) {
                matches.push(entry.into_path());
            }
        }
        Ok(matches)
    }
}

impl Default for FileSearchTool {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Tool for FileSearchTool {
    fn name(&self) -> &str {
        "file_search"
    }

    fn description(&self) -> &str {
        "Search for files by name in the filesystem"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let term = input.trim().to_string();
        let root = self.root.clone();

        debug!(root = %root.display(), term = %term, "Searching files");

        let (search_root, search_term) = (root.clone(), term.clone());
        let matches = tokio::task::spawn_blocking(move || Self::search(&search_root, &search_term))
            .await
            .map_err(|e| ToolError::Io {
                path: root.display().to_string(),
                reason: format!("search task failed: {e}"),
            })?
            .map_err(|e| ToolError::Io {
                path: e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string()),
                reason: e.to_string(),
            })?;

        if matches.is_empty() {
            return Ok(format!("No files matching '{term}' found"));
        }

        let mut output = format!("Files matching '{term}':\n");
        for path in &matches {
            output.push_str(&format!("- {}\n", path.display()));
        }
        Ok(output)
    }
}
