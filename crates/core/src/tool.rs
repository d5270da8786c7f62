//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! search the web, find files, read and edit them.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::ToolError;

/// The core Tool trait.
///
/// Each tool takes a single free-text input and produces free-text output.
/// Tools are registered in the [`ToolRegistry`] and made available to the
/// agent loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "file_read").
    fn name(&self) -> &str;

    /// A description of what this tool does (listed in the system prompt).
    fn description(&self) -> &str;

    /// Execute the tool with the given input.
    async fn execute(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools.
///
/// Iteration follows registration order, so the capability listing and
/// tool-name detection are reproducible.
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name,
    /// keeping the original position.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::debug!(tool = %name, "Replaced previously registered tool");
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, input: &str) -> std::result::Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(input).await
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Human-readable capability listing, one `- name: description` line per tool.
    pub fn describe(&self) -> String {
        self.tools
            .values()
            .map(|t| format!("- {}: {}\n", t.name(), t.description()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
