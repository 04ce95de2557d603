//! Conversation domain.
//!
//! - [`entities::Message`] — a single message within a conversation
//! - [`options::GenerationOptions`] — sampling options passed to the backend
//! - [`stream::StreamEvent`] — incremental events of a streamed completion

pub mod entities;
pub mod options;
pub mod stream;
