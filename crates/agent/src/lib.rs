//! The agent orchestrator for Ferrule.
//!
//! One turn follows a fixed cycle:
//!
//! 1. **Append** the operator's message to the transcript
//! 2. **Query** the gateway with the whole transcript
//! 3. **If the reply asks for a tool**: pick it, extract its input, run it,
//!    append the result and query once more
//! 4. **Return** the final reply
//!
//! There is at most one tool call per turn. Tool requests are usually
//! recognised heuristically in free text (see [`protocol`]); a gateway that
//! returns a structured tool call bypasses the heuristics.

pub mod loop_runner;
pub mod prompt;
pub mod protocol;

pub use loop_runner::Agent;
pub use prompt::build_system_prompt;
