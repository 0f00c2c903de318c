//! Model adapter implementations.

pub mod google;
pub mod mock;

// Re-export commonly used adapter types
pub use google::{GoogleBackend, GoogleGenAIAdapter, VertexAuth};
pub use mock::ScriptedAdapter;
