//! Web search tool: stub that returns mock search results.
//!
//! In production this would call a real search API. The stub returns
//! deterministic results so the agent loop can be exercised end-to-end
//! without network access.

use async_trait::async_trait;
use ferrule_core::error::ToolError;
use ferrule_core::tool::Tool;

const DEFAULT_RESULT_COUNT: usize = 3;

pub struct WebSearchTool {
    result_count: usize,
}

impl WebSearchTool {
    pub fn new() -> Self {
        Self {
            result_count: DEFAULT_RESULT_COUNT,
        }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information"
    }

    async fn execute(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        let mut output = format!("Mock search results for '{query}':\n");
        for i in 1..=self.result_count {
            output.push_str(&format!(
                "{i}. Result {i} for: {query} (https://example.com/search?q={}&p={i})\n",
                query_param(query)
            ));
        }
        Ok(output)
    }
}

fn query_param(s: &str) -> String {
    s.replace(' ', "+")
}
