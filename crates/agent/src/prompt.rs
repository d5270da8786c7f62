//! The system prompt that seeds every new conversation.

use ferrule_core::tool::ToolRegistry;

const PREAMBLE: &str =
    "You are a helpful AI assistant powered by Claude. You have access to these tools:\n\n";

const USAGE: &str = "\nTo use a tool, simply mention its name and what you want to do with it. \
For example: 'I need to use the web_search tool to find information about...' \
or 'I'll use file_search to look for...'.";

const FILE_EDIT_USAGE: &str = r##"

To use the file_edit tool, include a JSON object with the following structure:
```json
{
  "file_path": "path/to/file.txt", // Required: Path to the file to edit
  "operation": "replace", // Required: Either 'replace' or 'append'
  "content": "new content", // Required: The content to write
  "start_line": 1, // Optional: Line number to start replacing (only for replace)
  "end_line": 5 // Optional: Line number to end replacing (only for replace)
}
```
For example: 'I'll use the file_edit tool to update the README.md file: {"file_path": "README.md", "operation": "replace", "content": "# Updated README"}'."##;

/// Build the system prompt: the capability listing for `tools` followed by
/// usage instructions and the file-edit payload template.
pub fn build_system_prompt(tools: &ToolRegistry) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str(&tools.describe());
    prompt.push_str(USAGE);
    prompt.push_str(FILE_EDIT_USAGE);
    prompt
}
