//! Console output formatter for consensus results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use consensus_domain::ConsensusResult;
use consensus_domain::run::state::preview;
use std::time::Duration;

/// Formats consensus results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(result: &ConsensusResult) -> String {
        let mut output = String::new();

        for response in &result.responses {
            let title = format!(
                "┌─ {} ({}) [{:.1}s] ─┐",
                response.model,
                response.provider,
                response.latency.as_secs_f64()
            );
            output.push_str(&format!("\n{}\n", title.blue()));
            output.push_str(&Self::indent(&response.content, &format!("{} ", "│".blue())));
            output.push_str(&format!("\n{}\n", "└─────────────────────────┘".blue()));
        }

        output.push_str(&format!("\n{}\n", "╔═══ CONSENSUS ═══╗".green().bold()));
        output.push_str(&Self::indent(&result.consensus, &format!("{} ", "║".green())));
        output.push_str(&format!("\n{}\n", "╚═════════════════╝".green()));

        output.push_str(&Self::format_warnings(&result.warnings));

        output
    }

    /// Format as JSON
    pub fn format_json(result: &ConsensusResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the consensus only (concise output)
    pub fn format_consensus_only(result: &ConsensusResult) -> String {
        let mut output = result.consensus.clone();
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    /// Run summary with model counts and wall time
    pub fn format_summary(result: &ConsensusResult, total_time: Duration) -> String {
        format!(
            "\n{}\nModels queried: {} ({}, {})\nJudge: {}\nTotal time: {:.1}s\n",
            "─── Summary ───".dimmed(),
            result.requested_count(),
            format!("{} succeeded", result.succeeded_count()).green(),
            format!("{} failed", result.failed_models.len()).red(),
            result.judge_model,
            total_time.as_secs_f64()
        )
    }

    /// One line per warning, empty when there are none
    pub fn format_warnings(warnings: &[String]) -> String {
        if warnings.is_empty() {
            return String::new();
        }
        let mut output = String::from("\n");
        for warning in warnings {
            output.push_str(&Self::error(warning));
        }
        output
    }

    /// Boxed banner showing the (truncated) prompt
    pub fn header(prompt: &str) -> String {
        format!(
            "\n{}\n{} Prompt: {}\n{}\n",
            "╭─ LLM Consensus ─╮".cyan().bold(),
            "│".cyan(),
            preview(prompt, 60).dimmed(),
            "╰─────────────────╯".cyan()
        )
    }

    pub fn phase(message: &str) -> String {
        format!("{}\n", format!("▸ {}", message).yellow().bold())
    }

    pub fn success(message: &str) -> String {
        format!("{}\n", format!("✓ {}", message).green())
    }

    pub fn error(message: &str) -> String {
        format!("{}\n", format!("✗ {}", message).red())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &ConsensusResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &ConsensusResult) -> String {
        Self::format_json(result)
    }

    fn format_consensus_only(&self, result: &ConsensusResult) -> String {
        Self::format_consensus_only(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::ModelResponse;

    fn sample() -> ConsensusResult {
        ConsensusResult {
            prompt: "What is Rust?".to_string(),
            responses: vec![
                ModelResponse::new("gpt", "A language.\nFast.", "openai")
                    .with_latency(Duration::from_millis(1500)),
                ModelResponse::new("claude", "A systems language.", "anthropic")
                    .with_latency(Duration::from_millis(900)),
            ],
            consensus: "Rust is a fast systems language.".to_string(),
            judge_model: "gpt".to_string(),
            warnings: vec!["gemini: timed out after 120s".to_string()],
            failed_models: vec!["gemini".to_string()],
        }
    }

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_full_format_contains_everything() {
        let text = plain(|| ConsoleFormatter::format(&sample()));

        assert!(text.contains("┌─ gpt (openai) [1.5s] ─┐"));
        assert!(text.contains("│ A language.\n│ Fast."));
        assert!(text.contains("┌─ claude (anthropic) [0.9s] ─┐"));
        assert!(text.contains("║ Rust is a fast systems language."));
        assert!(text.contains("✗ gemini: timed out after 120s"));
    }

    #[test]
    fn test_consensus_only() {
        let text = ConsoleFormatter::format_consensus_only(&sample());
        assert_eq!(text, "Rust is a fast systems language.\n");
    }

    #[test]
    fn test_json_uses_result_contract() {
        let json = ConsoleFormatter::format_json(&sample());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["prompt"], "What is Rust?");
        assert_eq!(value["judge"], "gpt");
        assert_eq!(value["responses"][0]["latency_ms"], 1500);
        assert_eq!(value["failed_models"][0], "gemini");
    }

    #[test]
    fn test_summary_counts() {
        let text = plain(|| ConsoleFormatter::format_summary(&sample(), Duration::from_secs(3)));

        assert!(text.contains("Models queried: 3 (2 succeeded, 1 failed)"));
        assert!(text.contains("Judge: gpt"));
        assert!(text.contains("Total time: 3.0s"));
    }

    #[test]
    fn test_no_warnings_renders_nothing() {
        assert!(ConsoleFormatter::format_warnings(&[]).is_empty());
    }

    #[test]
    fn test_header_truncates_long_prompt() {
        let prompt = "word ".repeat(40);
        let text = plain(|| ConsoleFormatter::header(&prompt));
        assert!(text.contains('…'));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
