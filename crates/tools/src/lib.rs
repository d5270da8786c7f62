//! Built-in tool implementations for Ferrule.
//!
//! Tools give the agent the ability to interact with the world:
//! search the web (stubbed), find files by name, read them and edit them.

pub mod file_edit;
pub mod file_read;
pub mod file_search;
pub mod web_search;

use ferrule_config::ToolsConfig;
use ferrule_core::tool::ToolRegistry;

pub use file_edit::{FileEditRequest, FileEditTool};
pub use file_read::FileReadTool;
pub use file_search::FileSearchTool;
pub use web_search::WebSearchTool;

/// Create a registry with all built-in tools, in their canonical order:
/// `web_search`, `file_search`, `file_read`, `file_edit`.
pub fn default_registry(config: &ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new()));
    registry.register(Box::new(FileSearchTool::new(config.search_root.clone())));
    registry.register(Box::new(FileReadTool));
    registry.register(Box::new(if config.strict_line_range {
        FileEditTool::strict()
    } else {
        FileEditTool::new()
    }));
    registry
}
