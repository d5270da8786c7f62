//! The agent turn loop.

use std::sync::Arc;

use ferrule_config::AppConfig;
use ferrule_core::error::Error;
use ferrule_core::gateway::{Completion, Gateway, ToolInvocation};
use ferrule_core::message::{Conversation, Message};
use ferrule_core::tool::ToolRegistry;
use ferrule_memory::ConversationFile;
use tracing::{debug, info, warn};

use crate::prompt::build_system_prompt;
use crate::protocol;

/// Owns the transcript and drives one turn at a time.
///
/// A turn is at most two gateway queries with one tool call in between.
/// Because [`Agent::process`] takes `&mut self`, turns never overlap.
pub struct Agent {
    /// The transcript, seeded with the system prompt or loaded from disk
    conversation: Conversation,

    /// The language-model backend
    gateway: Arc<dyn Gateway>,

    /// Tools the model may call
    tools: ToolRegistry,

    /// Where the transcript is persisted, if anywhere
    store: Option<ConversationFile>,

    /// Skip the `web_search` fallback when no registered tool is named
    strict_tool_detection: bool,
}

impl Agent {
    /// Create an agent with a fresh transcript holding only the system prompt.
    pub fn new(gateway: Arc<dyn Gateway>, tools: ToolRegistry) -> Self {
        let conversation = Conversation::with_system(build_system_prompt(&tools));
        Self {
            conversation,
            gateway,
            tools,
            store: None,
            strict_tool_detection: false,
        }
    }

    /// Build an agent from configuration: the built-in tools, strictness
    /// flags, and the transcript persisted at `config.conversation_file`.
    pub fn from_config(config: &AppConfig, gateway: Arc<dyn Gateway>) -> Result<Self, Error> {
        let tools = ferrule_tools::default_registry(&config.tools);
        Self::new(gateway, tools)
            .with_strict_tool_detection(config.agent.strict_tool_detection)
            .with_store(ConversationFile::new(&config.conversation_file))
    }

    /// Persist to `store`. A transcript already saved there replaces the
    /// fresh one.
    pub fn with_store(mut self, store: ConversationFile) -> Result<Self, Error> {
        if let Some(saved) = store.load()? {
            info!(
                path = %store.path().display(),
                messages = saved.len(),
                "Resuming saved conversation"
            );
            self.conversation = saved;
        }
        self.store = Some(store);
        Ok(self)
    }

    pub fn with_strict_tool_detection(mut self, strict: bool) -> Self {
        self.strict_tool_detection = strict;
        self
    }

    /// Read-only snapshot of the transcript.
    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn append(&mut self, message: Message) {
        self.conversation.push(message);
    }

    /// Write the transcript to the store. A no-op for agents without one.
    pub fn save(&self) -> Result<(), Error> {
        match &self.store {
            Some(store) => Ok(store.save(&self.conversation)?),
            None => {
                debug!("No conversation store configured, skipping save");
                Ok(())
            }
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one turn for `input` and return the final reply.
    ///
    /// On error the transcript keeps whatever was appended before the
    /// failure: the user message always, and the tool-requesting reply if
    /// the tool step failed.
    pub async fn process(&mut self, input: &str) -> Result<String, Error> {
        info!(
            gateway = self.gateway.name(),
            messages = self.conversation.len(),
            "Processing turn"
        );

        self.conversation.push(Message::user(input));
        let first = self.gateway.query(self.conversation.messages()).await?;

        let Some(call) = self.resolve_tool_call(&first) else {
            debug!("Reply requests no tool");
            self.conversation.push(Message::assistant(&first.text));
            return Ok(first.text);
        };

        self.conversation.push(Message::assistant(&first.text));

        info!(tool = %call.name, "Executing tool");
        debug!(tool = %call.name, input = %call.input, "Tool input");
        let output = self
            .tools
            .execute(&call.name, &call.input)
            .await
            .inspect_err(|e| warn!(tool = %call.name, error = %e, "Tool failed"))?;

        self.conversation
            .push(Message::tool_result(&call.name, &output));

        let last = self.gateway.query(self.conversation.messages()).await?;
        self.conversation.push(Message::assistant(&last.text));
        Ok(last.text)
    }

    /// The tool call a reply asks for: the backend's structured call if it
    /// sent one, otherwise whatever the free-text protocol detects.
    fn resolve_tool_call(&self, reply: &Completion) -> Option<ToolInvocation> {
        if let Some(call) = &reply.tool_call {
            return Some(call.clone());
        }
        if !protocol::should_use_tool(&reply.text, &self.tools) {
            return None;
        }

        let Some(name) =
            protocol::detect_tool_name(&reply.text, &self.tools, self.strict_tool_detection)
        else {
            debug!("Tool phrase without a registered tool name, treating as plain reply");
            return None;
        };
        let input = protocol::extract_tool_input(&name, &reply.text);
        Some(ToolInvocation { name, input })
    }
}
