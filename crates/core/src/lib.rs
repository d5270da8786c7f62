//! # Ferrule Core
//!
//! Domain types, traits, and error definitions for the Ferrule agent.
//! This crate has **no framework dependencies**: it defines the domain model
//! that the tool, gateway, memory and agent crates implement against.
//!
//! ## Layout
//!
//! - [`message`]: role-tagged messages and the ordered conversation transcript
//! - [`tool`]: the `Tool` capability trait and the insertion-ordered registry
//! - [`gateway`]: the language-model gateway trait and its completion type
//! - [`error`]: one error enum per bounded context

pub mod error;
pub mod gateway;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{EditError, Error, MemoryError, ProviderError, ToolError};
pub use gateway::{Completion, Gateway, ToolInvocation};
pub use message::{Conversation, Message, Role};
pub use tool::{Tool, ToolRegistry};
