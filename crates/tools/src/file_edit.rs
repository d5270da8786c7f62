//! File edit tool: line-addressed replace and append on existing files.
//!
//! The tool input is a JSON object:
//!
//! ```json
//! {"file_path": "notes.txt", "operation": "replace", "content": "X\nY",
//!  "start_line": 2, "end_line": 2}
//! ```
//!
//! Line numbers are 1-based and inclusive, and always refer to the file as it
//! is at the moment of the edit. Only whole lines are replaced.
//!
//! Checks run in a fixed order and each one fails with its own error:
//! payload parses, `file_path` present, `operation` present, path exists
//! (a missing path with non-empty content is created instead), path is not a
//! directory. The rewrite keeps the file's original permissions. It is a
//! plain overwrite, not a temp-file-and-rename.

use std::path::Path;

use async_trait::async_trait;
use ferrule_core::error::{EditError, ToolError};
use ferrule_core::tool::Tool;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// A parsed file-edit payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEditRequest {
    #[serde(default)]
    pub file_path: String,

    /// `"replace"` or `"append"`
    #[serde(default)]
    pub operation: String,

    #[serde(default)]
    pub content: String,

    /// First line to replace. Unset or 0 together with `end_line` means the whole file.
    #[serde(default)]
    pub start_line: Option<i64>,

    /// Last line to replace, inclusive.
    #[serde(default)]
    pub end_line: Option<i64>,
}

impl FileEditRequest {
    /// Parse and check the mandatory fields.
    pub fn parse(input: &str) -> Result<Self, EditError> {
        let request: Self =
            serde_json::from_str(input).map_err(|e| EditError::InvalidPayload {
                reason: e.to_string(),
                input: input.to_string(),
            })?;

        if request.file_path.is_empty() {
            return Err(EditError::MissingField("file_path"));
        }
        if request.operation.is_empty() {
            return Err(EditError::MissingField("operation"));
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOperation {
    Replace,
    Append,
}

impl std::str::FromStr for EditOperation {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            other => Err(EditError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// Replace lines `start..=end` of `current` with the lines of `content`.
///
/// With both bounds unset (or 0) the whole content is replaced. An `end`
/// before `start` or past the last line is clamped to the last line, unless
/// `strict` is set, in which case an `end` past the last line or explicitly
/// before `start` is rejected. An unset `end` always means "to the last line".
pub fn replace_lines(
    current: &str,
    content: &str,
    start: Option<i64>,
    end: Option<i64>,
    strict: bool,
) -> Result<String, EditError> {
    let start = start.unwrap_or(0);
    let mut end = end.unwrap_or(0);

    if start == 0 && end == 0 {
        return Ok(content.to_string());
    }

    let lines: Vec<&str> = current.split('\n').collect();
    let line_count = lines.len();

    if start < 1 || start as usize > line_count {
        return Err(EditError::LineOutOfRange {
            field: "start_line",
            value: start,
            max: line_count,
        });
    }

    if end < start || end as usize > line_count {
        if strict && end != 0 {
            return Err(EditError::LineOutOfRange {
                field: "end_line",
                value: end,
                max: line_count,
            });
        }
        end = line_count as i64;
    }

    let (start, end) = (start as usize, end as usize);
    let spliced: Vec<&str> = lines[..start - 1]
        .iter()
        .copied()
        .chain(content.split('\n'))
        .chain(lines[end..].iter().copied())
        .collect();

    Ok(spliced.join("\n"))
}

/// Append `content` so that it always starts on its own line.
pub fn append_content(current: &str, content: &str) -> String {
    if current.ends_with('\n') {
        format!("{current}{content}")
    } else {
        format!("{current}\n{content}")
    }
}

pub struct FileEditTool {
    /// Reject out-of-range `end_line` values instead of clamping them.
    pub strict_line_range: bool,
}

impl FileEditTool {
    pub fn new() -> Self {
        Self {
            strict_line_range: false,
        }
    }

    pub fn strict() -> Self {
        Self {
            strict_line_range: true,
        }
    }
}

impl Default for FileEditTool {
    fn default() -> Self {
        Self::new()
    }
}

fn io_error(path: &str, action: &str, e: std::io::Error) -> ToolError {
    ToolError::Io {
        path: path.to_string(),
        reason: format!("failed to {action}: {e}"),
    }
}

/// Create a new file holding exactly `content` (mode 0644 on Unix).
async fn create_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o644);

    let mut file = options.open(path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

#[async_trait]
impl Tool for FileEditTool {
    fn name(&self) -> &str {
        "file_edit"
    }

    fn description(&self) -> &str {
        "Edit a file - can replace entire file, replace specific lines, or append content (input is JSON)"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        debug!(input = %input, "file_edit received input");

        let request = FileEditRequest::parse(input)?;
        let path = request.file_path.as_str();

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if request.content.is_empty() {
                    return Err(ToolError::FileNotFound(path.to_string()));
                }
                create_file(Path::new(path), &request.content)
                    .await
                    .map_err(|e| io_error(path, "create file", e))?;
                return Ok(format!(
                    "Created new file {path} with {} bytes",
                    request.content.len()
                ));
            }
            Err(e) => return Err(io_error(path, "access file", e)),
        };

        if metadata.is_dir() {
            return Err(ToolError::IsDirectory(path.to_string()));
        }

        let current = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| io_error(path, "read file", e))?;

        let new_content = match request.operation.parse::<EditOperation>()? {
            EditOperation::Replace => replace_lines(
                &current,
                &request.content,
                request.start_line,
                request.end_line,
                self.strict_line_range,
            )?,
            EditOperation::Append => append_content(&current, &request.content),
        };

        tokio::fs::write(path, &new_content)
            .await
            .map_err(|e| io_error(path, "write to file", e))?;
        tokio::fs::set_permissions(path, metadata.permissions())
            .await
            .map_err(|e| io_error(path, "restore permissions", e))?;

        Ok(format!(
            "Successfully edited {path} ({} bytes written)",
            new_content.len()
        ))
    }
}
