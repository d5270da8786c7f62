//! Gateway trait: the abstraction over the language-model backend.
//!
//! A Gateway takes the full transcript and returns a single completion.
//! Implementations: the Anthropic Messages API client in `ferrule-providers`,
//! plus scripted gateways in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// A structured request to run one tool with one text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the tool to execute
    pub name: String,

    /// Raw text input handed to the tool
    pub input: String,
}

/// The result of one gateway query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Reply text
    pub text: String,

    /// Tool call reported by the backend itself, when it supports structured
    /// output. `None` means the agent falls back to reading the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolInvocation>,
}

impl Completion {
    /// A plain text completion with no structured tool call.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_call: None,
        }
    }

    /// Attach a structured tool call.
    pub fn with_tool_call(mut self, name: impl Into<String>, input: impl Into<String>) -> Self {
        self.tool_call = Some(ToolInvocation {
            name: name.into(),
            input: input.into(),
        });
        self
    }
}

/// The core Gateway trait.
///
/// The agent calls `query()` without knowing which backend answers.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// A human-readable name for this gateway (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send the transcript and get a single completion back.
    async fn query(&self, messages: &[Message]) -> std::result::Result<Completion, ProviderError>;
}
