//! Application-level configuration.
//!
//! - [`ReasoningParams`] — loop control (iterations, timeouts, fallback text,
//!   classifier and cross-check tuning)

pub mod reasoning_params;

pub use reasoning_params::{DEFAULT_EMPTY_RESPONSE_FALLBACK, ReasoningParams};
