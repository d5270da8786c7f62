//! Conversation persistence for Ferrule.
//!
//! The transcript lives in memory for the whole run and is written back in
//! full when the run ends. See [`ConversationFile`].

pub mod file_backend;

pub use file_backend::ConversationFile;
