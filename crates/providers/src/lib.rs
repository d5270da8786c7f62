//! Language-model gateway implementations for Ferrule.
//!
//! All gateways implement the `ferrule_core::Gateway` trait.

pub mod anthropic;

pub use anthropic::AnthropicGateway;
