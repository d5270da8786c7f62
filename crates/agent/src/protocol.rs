//! Free-text tool protocol.
//!
//! The model asks for a tool by naming it in plain prose ("I'll use
//! file_search to look for main.rs"). These functions decide whether a reply
//! is such a request, which tool it names and what input to hand the tool.
//! All matching is substring based and runs in registry order.

use ferrule_core::tool::ToolRegistry;

pub const WEB_SEARCH_TOOL: &str = "web_search";
pub const FILE_EDIT_TOOL: &str = "file_edit";

/// Payload handed to `file_edit` when the reply carries no JSON object.
/// It is well-formed JSON but not a valid edit request, so the tool rejects it.
pub const MISSING_JSON_PAYLOAD: &str = r#"{"error": "Could not extract valid JSON from input. Please provide a valid JSON object with file_path, operation, and content fields."}"#;

/// Removed from the text after the tool name, in this order.
const FILLER: [&str; 8] = ["tool", "to", "with", "for", "using", "use", "the", ":"];

fn first_named_tool<'a>(reply: &str, tools: &'a ToolRegistry) -> Option<&'a str> {
    let lowered = reply.to_lowercase();
    tools
        .names()
        .into_iter()
        .find(|name| lowered.contains(&name.to_lowercase()))
}

/// Does `reply` ask for a tool?
///
/// True when it names any registered tool, or when it contains both
/// "use the" and "tool" (case-insensitive).
pub fn should_use_tool(reply: &str, tools: &ToolRegistry) -> bool {
    if first_named_tool(reply, tools).is_some() {
        return true;
    }
    let lowered = reply.to_lowercase();
    lowered.contains("use the") && lowered.contains("tool")
}

/// Pick the tool a reply asks for: the first registered name it mentions.
///
/// When no registered name occurs, falls back to `web_search`, or returns
/// `None` under `strict`.
pub fn detect_tool_name(reply: &str, tools: &ToolRegistry, strict: bool) -> Option<String> {
    match first_named_tool(reply, tools) {
        Some(name) => Some(name.to_string()),
        None if strict => None,
        None => Some(WEB_SEARCH_TOOL.to_string()),
    }
}

/// Derive the input for `tool_name` from the reply that requested it.
///
/// `file_edit` gets the span from the first `{` to the last `}`. Every other
/// tool gets the text after the first mention of its name with the filler
/// words stripped out. Filler removal is literal, so it also cuts those
/// letters out of longer words ("the" in "weather").
pub fn extract_tool_input(tool_name: &str, reply: &str) -> String {
    if tool_name == FILE_EDIT_TOOL {
        return match (reply.find('{'), reply.rfind('}')) {
            (Some(start), Some(end)) if end > start => reply[start..=end].to_string(),
            _ => MISSING_JSON_PAYLOAD.to_string(),
        };
    }

    // ASCII folding keeps byte offsets aligned with `reply`.
    let Some(index) = reply
        .to_ascii_lowercase()
        .find(&tool_name.to_ascii_lowercase())
    else {
        return reply.to_string();
    };

    let mut rest = reply[index + tool_name.len()..].to_string();
    for phrase in FILLER {
        rest = rest.replace(phrase, "");
    }
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ferrule_core::error::ToolError;
    use ferrule_core::tool::Tool;

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "test tool"
        }
        async fn execute(&self, input: &str) -> Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        for name in ["web_search", "file_search", "file_read", "file_edit"] {
            tools.register(Box::new(Named(name)));
        }
        tools
    }

    #[test]
    fn detects_tool_name_case_insensitively() {
        let tools = registry();
        assert!(should_use_tool("Let me call FILE_READ on it", &tools));
        assert_eq!(
            detect_tool_name("Let me call FILE_READ on it", &tools, false).as_deref(),
            Some("file_read")
        );
    }

    #[test]
    fn plain_reply_needs_no_tool() {
        assert!(!should_use_tool("Rust is a systems language.", &registry()));
    }

    #[test]
    fn use_the_tool_phrase_triggers_detection() {
        let tools = registry();
        let reply = "I should use the calculator tool for this";
        assert!(should_use_tool(reply, &tools));
        assert_eq!(
            detect_tool_name(reply, &tools, false).as_deref(),
            Some("web_search")
        );
    }

    #[test]
    fn strict_detection_has_no_fallback() {
        let tools = registry();
        assert_eq!(
            detect_tool_name("I should use the calculator tool", &tools, true),
            None
        );
        assert_eq!(
            detect_tool_name("run file_search now", &tools, true).as_deref(),
            Some("file_search")
        );
    }

    #[test]
    fn registration_order_breaks_ties() {
        let tools = registry();
        let reply = "I'll use file_read after file_search";
        assert_eq!(
            detect_tool_name(reply, &tools, false).as_deref(),
            Some("file_search")
        );
    }

    #[test]
    fn strips_filler_after_tool_name() {
        assert_eq!(
            extract_tool_input("file_search", "I'll use file_search to look for main.go"),
            "look  main.go"
        );
    }

    #[test]
    fn filler_removal_is_literal() {
        assert_eq!(
            extract_tool_input("web_search", "Let me use web_search: weather in Paris"),
            "wear in Paris"
        );
    }

    #[test]
    fn extraction_matches_name_case_insensitively() {
        assert_eq!(
            extract_tool_input("file_read", "Calling FILE_READ src/lib.rs"),
            "src/lib.rs"
        );
    }

    #[test]
    fn missing_name_returns_reply_unchanged() {
        let reply = "I should use the calculator tool";
        assert_eq!(extract_tool_input("web_search", reply), reply);
    }

    #[test]
    fn file_edit_takes_outermost_braces() {
        let reply = r#"I'll use the file_edit tool: {"file_path": "a.txt", "operation": "append", "content": "{x}"} done"#;
        assert_eq!(
            extract_tool_input("file_edit", reply),
            r#"{"file_path": "a.txt", "operation": "append", "content": "{x}"}"#
        );
    }

    #[test]
    fn file_edit_without_json_gets_error_payload() {
        assert_eq!(
            extract_tool_input("file_edit", "use file_edit on README"),
            MISSING_JSON_PAYLOAD
        );
        assert_eq!(
            extract_tool_input("file_edit", "} backwards {"),
            MISSING_JSON_PAYLOAD
        );
    }
}
