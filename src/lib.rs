//! A small agent toolkit over Google's generative AI backends.
//!
//! A [`ModelAdapter`] turns a [`Prompt`] into either a final answer or a
//! request to call a tool. The [`agent::AgentRunner`] drives that loop,
//! dispatching directives to a [`tools::ToolSet`] until the model answers
//! or the iteration limit is hit. The [`weather`] module builds an office
//! attire report on top of the same adapter.

pub mod adapter;
pub mod agent;
pub mod error;
pub mod factory;
pub mod providers;
pub mod response;
pub mod telemetry;
pub mod tools;
pub mod types;
pub mod weather;

// Re-export core types for easy usage
pub use adapter::ModelAdapter;
pub use error::{AgentError, Error, ToolError, WeatherError};
pub use factory::{AdapterConfig, BackendConfig};
pub use response::*;
pub use types::*;
