//! Per-model query progress state.
//!
//! [`ModelQueryState`] tracks one model through
//! `Pending → Running → Streaming* → Complete | Failed`. It is transient UI
//! state, rebuilt for every run and never persisted. [`QueryStateBoard`]
//! keeps the states of a whole run in request order.

use std::time::{Duration, Instant};

/// Maximum characters kept in [`ModelQueryState::last_chunk_preview`].
pub const PREVIEW_MAX_CHARS: usize = 30;

/// Rough characters-per-token ratio used for display estimates.
const CHARS_PER_TOKEN: usize = 4;

/// Status of a single model query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Pending,
    Running,
    Streaming,
    Complete,
    Failed,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Pending => "pending",
            QueryStatus::Running => "running",
            QueryStatus::Streaming => "streaming",
            QueryStatus::Complete => "complete",
            QueryStatus::Failed => "failed",
        }
    }

    /// `Complete` and `Failed` are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryStatus::Complete | QueryStatus::Failed)
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress state of one model during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelQueryState {
    pub model: String,
    pub status: QueryStatus,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    /// Characters received so far across all chunks
    pub char_count: usize,
    /// Single-line, truncated copy of the most recent chunk
    pub last_chunk_preview: String,
    pub error: Option<String>,
}

impl ModelQueryState {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            status: QueryStatus::Pending,
            start_time: None,
            end_time: None,
            char_count: 0,
            last_chunk_preview: String::new(),
            error: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.status.is_terminal() {
            return;
        }
        self.status = QueryStatus::Running;
        self.start_time = Some(now);
    }

    /// Record a streamed chunk. Ignored once the query reached a terminal state.
    pub fn record_chunk(&mut self, chunk: &str) {
        if self.status.is_terminal() {
            return;
        }
        self.status = QueryStatus::Streaming;
        self.char_count += chunk.chars().count();
        let preview = preview(chunk, PREVIEW_MAX_CHARS);
        if !preview.is_empty() {
            self.last_chunk_preview = preview;
        }
    }

    pub fn complete(&mut self, now: Instant) {
        self.status = QueryStatus::Complete;
        self.end_time = Some(now);
    }

    pub fn fail(&mut self, now: Instant, error: impl Into<String>) {
        self.status = QueryStatus::Failed;
        self.end_time = Some(now);
        self.error = Some(error.into());
    }

    /// Estimated token count (~4 characters per token).
    pub fn token_estimate(&self) -> usize {
        self.char_count / CHARS_PER_TOKEN
    }

    /// Time spent so far, or total duration once finished.
    ///
    /// Returns zero for a query that never started.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }
}

/// Flatten a chunk to one line and cut it to `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flattened = text.replace(['\n', '\r'], " ");
    let trimmed = flattened.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// States of every model in a run, in request order
#[derive(Debug, Clone, Default)]
pub struct QueryStateBoard {
    states: Vec<ModelQueryState>,
}

impl QueryStateBoard {
    /// Create a board with one pending entry per model (duplicates collapsed).
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut states: Vec<ModelQueryState> = Vec::new();
        for model in models {
            let model = model.into();
            if !states.iter().any(|s| s.model == model) {
                states.push(ModelQueryState::new(model));
            }
        }
        Self { states }
    }

    pub fn get(&self, model: &str) -> Option<&ModelQueryState> {
        self.states.iter().find(|s| s.model == model)
    }

    /// Mutable access; unknown models are ignored by returning `None`.
    pub fn get_mut(&mut self, model: &str) -> Option<&mut ModelQueryState> {
        self.states.iter_mut().find(|s| s.model == model)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelQueryState> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn count(&self, status: QueryStatus) -> usize {
        self.states.iter().filter(|s| s.status == status).count()
    }

    pub fn all_finished(&self) -> bool {
        self.states.iter().all(|s| s.status.is_terminal())
    }
}
