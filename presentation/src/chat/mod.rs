//! Interactive chat module
//!
//! Provides a line-editor chat interface and the terminal [`ChatUiPort`]
//! adapter it talks through.
//!
//! [`ChatUiPort`]: toolgate_application::ChatUiPort

mod console_ui;
mod repl;

pub use console_ui::ConsoleChatUi;
pub use repl::ChatRepl;
