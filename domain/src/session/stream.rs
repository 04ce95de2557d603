//! Streaming events for model completions.
//!
//! [`StreamEvent`] represents individual events in a streamed completion,
//! enabling live display of model output as it is generated. The concatenated
//! `Delta` chunks equal the text a non-streamed call would return.

/// An event in a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) => Some(s),
            StreamEvent::Error(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_accessor() {
        assert_eq!(StreamEvent::Delta("a".into()).text(), Some("a"));
        assert_eq!(StreamEvent::Completed("ab".into()).text(), Some("ab"));
        assert_eq!(StreamEvent::Error("x".into()).text(), None);
    }

    #[test]
    fn test_terminal_events() {
        assert!(!StreamEvent::Delta("a".into()).is_terminal());
        assert!(StreamEvent::Completed(String::new()).is_terminal());
        assert!(StreamEvent::Error("boom".into()).is_terminal());
    }
}
