//! Ollama-compatible chat backend
//!
//! Talks to `POST /api/chat`, either with a single JSON reply or a stream of
//! newline-delimited JSON chunks.

pub mod error;
pub mod gateway;
pub mod protocol;

pub use error::OllamaError;
pub use gateway::{DEFAULT_BASE_URL, OllamaGateway};
