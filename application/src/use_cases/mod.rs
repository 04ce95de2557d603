//! Use cases (application services)
//!
//! - [`reasoning_loop`] — classify a query and run the ReAct loop
//! - [`handle_message`] — one chat turn, including approval answers
//! - [`preload`] — ensure-initialized shared model backend

pub mod handle_message;
pub mod preload;
pub mod reasoning_loop;
pub(crate) mod shared;
pub(crate) mod tool_helpers;
