//! Built-in tool provider module

mod provider;

pub use provider::{BUILTIN_PRIORITY, BuiltinProvider};
