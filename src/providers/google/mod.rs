pub mod client;
pub mod types;

pub use client::{GoogleBackend, GoogleGenAIAdapter, VertexAuth, DEFAULT_MODEL};
