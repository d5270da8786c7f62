//! File read tool: return the whole contents of a file.

use async_trait::async_trait;
use ferrule_core::error::ToolError;
use ferrule_core::tool::Tool;

pub struct FileReadTool;

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file at the specified path"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let path = input.trim();
        if path.is_empty() {
            return Err(ToolError::InvalidInput("file path is empty".into()));
        }

        match tokio::fs::metadata(path).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ToolError::FileNotFound(path.to_string()));
            }
            Err(e) => {
                return Err(ToolError::Io {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
            }
            Ok(_) => {}
        }

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolError::Io {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}
