//! Progress reporting for consensus runs
//!
//! [`ProgressReporter`] keeps a [`QueryStateBoard`] and renders one spinner
//! line per model with indicatif. The judge gets its own line once every
//! model has finished, even when the judge is also one of the queried models.

use colored::Colorize;
use consensus_application::ports::progress::QueryProgressNotifier;
use consensus_domain::{ModelQueryState, ModelResponse, QueryStateBoard, QueryStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Width of the model-name column.
const NAME_WIDTH: usize = 25;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Judge line state, separate from the model board.
struct JudgeLine {
    state: ModelQueryState,
    bar: ProgressBar,
}

/// Reports progress during a consensus run with live spinner lines
pub struct ProgressReporter {
    multi: MultiProgress,
    board: Mutex<QueryStateBoard>,
    bars: Mutex<HashMap<String, ProgressBar>>,
    judge_model: String,
    judge: Mutex<Option<JudgeLine>>,
}

impl ProgressReporter {
    pub fn new(models: &[String], judge_model: impl Into<String>) -> Self {
        let multi = MultiProgress::new();
        let board = QueryStateBoard::new(models.iter().cloned());

        let mut bars = HashMap::new();
        for state in board.iter() {
            let bar = multi.add(ProgressBar::new_spinner());
            bar.set_style(Self::spinner_style());
            bar.set_prefix(truncate_name(&state.model));
            bar.set_message(render_status(state, Instant::now()));
            bars.insert(state.model.clone(), bar);
        }

        Self {
            multi,
            board: Mutex::new(board),
            bars: Mutex::new(bars),
            judge_model: judge_model.into(),
            judge: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {prefix:25} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Snapshot of the model states, for callers that want a summary.
    pub fn snapshot(&self) -> QueryStateBoard {
        lock(&self.board).clone()
    }

    /// Clear every line still spinning.
    pub fn finish(&self) {
        for bar in lock(&self.bars).values() {
            if !bar.is_finished() {
                bar.finish();
            }
        }
        if let Some(judge) = lock(&self.judge).as_ref() {
            if !judge.bar.is_finished() {
                judge.bar.finish();
            }
        }
    }

    /// Apply `update` to the judge line if `model` is the judge in its synthesis phase.
    fn update_judge(&self, model: &str, update: impl FnOnce(&mut ModelQueryState)) -> bool {
        if model != self.judge_model {
            return false;
        }
        let mut judge = lock(&self.judge);
        let Some(line) = judge.as_mut() else {
            return false;
        };
        update(&mut line.state);
        refresh(&line.bar, &line.state);
        true
    }

    fn update_model(&self, model: &str, update: impl FnOnce(&mut ModelQueryState)) {
        let mut board = lock(&self.board);
        let Some(state) = board.get_mut(model) else {
            return;
        };
        update(state);
        if let Some(bar) = lock(&self.bars).get(model) {
            refresh(bar, state);
        }
    }

    fn start_judge(&self, model: &str) {
        self.multi.suspend(|| {
            eprintln!("{} {}", "▸".yellow().bold(), "Synthesizing consensus...".yellow().bold());
        });

        let mut state = ModelQueryState::new(model);
        state.start(Instant::now());

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_prefix(truncate_name(&format!("{} (judge)", model)));
        bar.enable_steady_tick(Duration::from_millis(100));
        refresh(&bar, &state);

        *lock(&self.judge) = Some(JudgeLine { state, bar });
    }
}

impl QueryProgressNotifier for ProgressReporter {
    fn on_model_start(&self, model: &str) {
        let judge_phase = model == self.judge_model
            && lock(&self.judge).is_none()
            && lock(&self.board).all_finished();
        if judge_phase {
            self.start_judge(model);
            return;
        }

        if let Some(bar) = lock(&self.bars).get(model) {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        self.update_model(model, |state| state.start(Instant::now()));
    }

    fn on_model_stream(&self, model: &str, chunk: &str) {
        if self.update_judge(model, |state| state.record_chunk(chunk)) {
            return;
        }
        self.update_model(model, |state| state.record_chunk(chunk));
    }

    fn on_model_complete(&self, model: &str, _response: &ModelResponse) {
        if self.update_judge(model, |state| state.complete(Instant::now())) {
            return;
        }
        self.update_model(model, |state| state.complete(Instant::now()));
    }

    fn on_model_error(&self, model: &str, error: &str) {
        if self.update_judge(model, |state| state.fail(Instant::now(), error)) {
            return;
        }
        self.update_model(model, |state| state.fail(Instant::now(), error));
    }
}

fn refresh(bar: &ProgressBar, state: &ModelQueryState) {
    let message = render_status(state, Instant::now());
    if state.status.is_terminal() {
        let icon = match state.status {
            QueryStatus::Complete => "✓".green().to_string(),
            _ => "✗".red().to_string(),
        };
        bar.set_style(
            ProgressStyle::default_spinner()
                .template(&format!("  {} {{prefix:25}} {{msg}}", icon))
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.finish_with_message(message);
    } else {
        bar.set_message(message);
    }
}

/// One-line status text for a model, as shown next to its name.
pub fn render_status(state: &ModelQueryState, now: Instant) -> String {
    let secs = state.elapsed(now).as_secs_f64();
    match state.status {
        QueryStatus::Pending => "pending".dimmed().to_string(),
        QueryStatus::Running => format!("connecting... {:.1}s", secs).yellow().to_string(),
        QueryStatus::Streaming => {
            let mut text = format!("streaming ~{} tokens {:.1}s", state.token_estimate(), secs);
            if !state.last_chunk_preview.is_empty() {
                text.push_str(&format!("  {}", state.last_chunk_preview));
            }
            text.cyan().to_string()
        }
        QueryStatus::Complete => format!(
            "done ~{} tokens in {:.1}s",
            state.token_estimate(),
            secs
        )
        .green()
        .to_string(),
        QueryStatus::Failed => format!(
            "failed: {}",
            state.error.as_deref().unwrap_or("unknown error")
        )
        .red()
        .to_string(),
    }
}

fn truncate_name(name: &str) -> String {
    consensus_domain::run::state::preview(name, NAME_WIDTH)
}

/// Simple line-based progress for non-interactive terminals
///
/// Prints one line per finished model to stderr and ignores streaming.
pub struct SimpleProgress;

impl QueryProgressNotifier for SimpleProgress {
    fn on_model_complete(&self, model: &str, response: &ModelResponse) {
        eprintln!(
            "  {} {} ({:.1}s)",
            "✓".green(),
            model,
            response.latency.as_secs_f64()
        );
    }

    fn on_model_error(&self, model: &str, error: &str) {
        eprintln!("  {} {}: {}", "✗".red(), model, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_render_pending() {
        let state = ModelQueryState::new("gpt");
        assert_eq!(plain(|| render_status(&state, Instant::now())), "pending");
    }

    #[test]
    fn test_render_streaming_shows_tokens_and_preview() {
        let t0 = Instant::now();
        let mut state = ModelQueryState::new("gpt");
        state.start(t0);
        state.record_chunk("Hello there, this is a\nstreamed chunk of text");

        let text = plain(|| render_status(&state, t0 + Duration::from_millis(1500)));
        assert!(text.starts_with("streaming ~11 tokens 1.5s"), "{text}");
        assert!(text.ends_with('…'), "{text}");
    }

    #[test]
    fn test_render_complete_and_failed() {
        let t0 = Instant::now();
        let mut done = ModelQueryState::new("a");
        done.start(t0);
        done.record_chunk("12345678");
        done.complete(t0 + Duration::from_secs(2));
        assert_eq!(
            plain(|| render_status(&done, Instant::now())),
            "done ~2 tokens in 2.0s"
        );

        let mut failed = ModelQueryState::new("b");
        failed.start(t0);
        failed.fail(t0, "timed out after 120s");
        assert_eq!(
            plain(|| render_status(&failed, Instant::now())),
            "failed: timed out after 120s"
        );
    }

    #[test]
    fn test_reporter_tracks_board() {
        let models = vec!["a".to_string(), "b".to_string()];
        let reporter = ProgressReporter::new(&models, "judge");

        reporter.on_model_start("a");
        reporter.on_model_stream("a", "abcd");
        reporter.on_model_complete("a", &ModelResponse::new("a", "abcd", "test"));
        reporter.on_model_start("b");
        reporter.on_model_error("b", "boom");
        reporter.finish();

        let board = reporter.snapshot();
        assert_eq!(board.get("a").unwrap().status, QueryStatus::Complete);
        assert_eq!(board.get("a").unwrap().char_count, 4);
        assert_eq!(board.get("b").unwrap().error.as_deref(), Some("boom"));
        assert!(board.all_finished());
    }

    #[test]
    fn test_judge_that_is_also_a_model_gets_its_own_line() {
        let models = vec!["a".to_string(), "b".to_string()];
        let reporter = ProgressReporter::new(&models, "a");

        for model in ["a", "b"] {
            reporter.on_model_start(model);
            reporter.on_model_complete(model, &ModelResponse::new(model, "x", "test"));
        }

        // Synthesis phase
        reporter.on_model_start("a");
        reporter.on_model_stream("a", "consensus text");
        reporter.on_model_complete("a", &ModelResponse::new("a", "consensus text", "test"));
        reporter.finish();

        // The synthesis chunk must not leak into the model line.
        let board = reporter.snapshot();
        assert_eq!(board.get("a").unwrap().status, QueryStatus::Complete);
        assert_eq!(board.get("a").unwrap().char_count, 0);

        let judge = lock(&reporter.judge);
        let line = judge.as_ref().unwrap();
        assert_eq!(line.state.status, QueryStatus::Complete);
        assert_eq!(line.state.char_count, "consensus text".len());
    }
}
