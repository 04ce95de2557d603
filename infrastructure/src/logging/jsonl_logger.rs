//! JSONL file writer for conversation events.
//!
//! Each [`ConversationEvent`] becomes one JSON object per line: the payload
//! fields plus `type`, `timestamp` (RFC 3339, UTC) and, when known, the
//! `session` id. Files are opened in append mode so a resumed session keeps
//! its history.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toolgate_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use tracing::warn;

/// JSONL conversation logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record.
pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    session: Option<String>,
}

impl JsonlConversationLogger {
    /// Open (or create) the log at `path`, creating parent directories.
    ///
    /// Returns `None` if the file cannot be opened; conversation logging is
    /// best-effort.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create conversation log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Could not open conversation log file {}: {}",
                    path.display(),
                    e
                );
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            session: None,
        })
    }

    /// Log for one session: `<dir>/<session>.conversation.jsonl`, with every
    /// record tagged by the session id.
    pub fn for_session(dir: impl AsRef<Path>, session_id: &str) -> Option<Self> {
        let file_name = format!("{}.conversation.jsonl", sanitize(session_id));
        let mut logger = Self::new(dir.as_ref().join(file_name))?;
        logger.session = Some(session_id.to_string());
        Some(logger)
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut map = match event.payload {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert(
            "type".to_string(),
            serde_json::Value::String(event.event_type.to_string()),
        );
        map.insert("timestamp".to_string(), serde_json::Value::String(timestamp));
        if let Some(session) = &self.session {
            map.insert("session".to_string(), serde_json::Value::String(session.clone()));
        }

        let Ok(line) = serde_json::to_string(&serde_json::Value::Object(map)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
