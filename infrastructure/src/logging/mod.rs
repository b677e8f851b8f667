//! Logging infrastructure: structured progress-event logging.
//!
//! Provides [`JsonlProgressLog`], a JSONL file writer that implements
//! the [`QueryProgressNotifier`](consensus_application::QueryProgressNotifier) port.

mod progress_log;

pub use progress_log::JsonlProgressLog;
