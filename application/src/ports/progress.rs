//! Progress notification port
//!
//! Defines the observer interface for per-model progress during a run.
//!
//! Events for one model always arrive in order:
//! `on_model_start → on_model_stream* → on_model_complete | on_model_error`.
//! Events of different models interleave arbitrarily.
//!
//! Notifiers are called inline from the concurrent query tasks, so they must
//! be fast and must not block (no I/O waits, no long locks).

use consensus_domain::ModelResponse;

/// Callback for progress updates during a consensus run
///
/// Implementations live in the presentation and infrastructure layers
/// (terminal progress display, JSONL event log). Every method has a no-op
/// default so observers only implement the events they care about.
pub trait QueryProgressNotifier: Send + Sync {
    /// Called when a model's query task starts
    fn on_model_start(&self, _model: &str) {}

    /// Called for each text chunk streamed by a model
    fn on_model_stream(&self, _model: &str, _chunk: &str) {}

    /// Called when a model answered successfully
    fn on_model_complete(&self, _model: &str, _response: &ModelResponse) {}

    /// Called when a model failed (lookup miss, provider error, timeout, cancellation)
    fn on_model_error(&self, _model: &str, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl QueryProgressNotifier for NoProgress {}
