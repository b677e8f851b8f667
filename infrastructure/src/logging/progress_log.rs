//! JSONL file writer for run progress events.
//!
//! Every progress callback becomes a single JSON line with a `type` field,
//! the `model`, and an RFC 3339 `timestamp`, appended via a buffered writer.

use consensus_application::ports::progress::QueryProgressNotifier;
use consensus_domain::ModelResponse;
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// JSONL progress log that writes one JSON object per event.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlProgressLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlProgressLog {
    /// Create a new log writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn log(&self, event_type: &str, model: &str, payload: Value) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        record.insert("type".to_string(), Value::String(event_type.to_string()));
        record.insert("model".to_string(), Value::String(model.to_string()));
        record.insert("timestamp".to_string(), Value::String(timestamp));

        let Ok(line) = serde_json::to_string(&Value::Object(record)) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Could not write to event log {}: {}", self.path.display(), e);
        }
    }
}

impl QueryProgressNotifier for JsonlProgressLog {
    fn on_model_start(&self, model: &str) {
        self.log("model_start", model, Value::Null);
    }

    fn on_model_stream(&self, model: &str, chunk: &str) {
        self.log(
            "model_stream",
            model,
            json!({ "chunk": chunk, "chars": chunk.chars().count() }),
        );
    }

    fn on_model_complete(&self, model: &str, response: &ModelResponse) {
        self.log(
            "model_complete",
            model,
            json!({
                "provider": response.provider,
                "latency_ms": response.latency_ms(),
                "chars": response.content.chars().count(),
            }),
        );
    }

    fn on_model_error(&self, model: &str, error: &str) {
        self.log("model_error", model, json!({ "error": error }));
    }
}

impl Drop for JsonlProgressLog {
    fn drop(&mut self) {
        let writer = self.writer.get_mut().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.flush();
    }
}
