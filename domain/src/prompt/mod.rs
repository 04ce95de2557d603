//! Prompt domain
//!
//! Persona and ReAct templates fed to the model at each step of the loop.

mod react;

pub use react::{DEFAULT_PERSONA, DEFAULT_PERSONA_NAME, ReactPromptTemplate};
