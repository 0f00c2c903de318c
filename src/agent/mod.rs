//! A bounded tool-calling agent loop.

pub mod runner;
pub mod transcript;

pub use runner::{AgentConfig, AgentRun, AgentRunner, Phase, DEFAULT_MAX_ITERATIONS};
pub use transcript::{Entry, Transcript};
