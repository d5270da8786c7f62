//! Error types for the Ferrule domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them all.

use thiserror::Error;

/// The top-level error type for all Ferrule operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Conversation persistence errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API error: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool {0} not found")]
    NotFound(String),

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("{0} is a directory, not a file")]
    IsDirectory(String),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Rejections raised while interpreting a file-edit payload.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid JSON input: {reason}, input was: {input}")]
    InvalidPayload { reason: String, input: String },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} {value} out of range: valid range is 1-{max}")]
    LineOutOfRange {
        field: &'static str,
        value: i64,
        max: usize,
    },

    #[error("unsupported operation: {0}. Use 'replace' or 'append'")]
    UnsupportedOperation(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted conversation file {path}: {reason}")]
    Corrupted { path: String, reason: String },
}
