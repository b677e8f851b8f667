//! Output formatter trait

use consensus_domain::ConsensusResult;

/// Trait for formatting consensus results
pub trait OutputFormatter {
    /// Format the complete result: every response, the consensus, warnings
    fn format(&self, result: &ConsensusResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &ConsensusResult) -> String;

    /// Format the consensus only (concise output)
    fn format_consensus_only(&self, result: &ConsensusResult) -> String;
}
