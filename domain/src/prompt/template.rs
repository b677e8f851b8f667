//! Judge prompt template
//!
//! The judge prompt is the quality-control mechanism of the whole run: it
//! tells the judge model how to turn several answers into one. The wording
//! below is a behavioral contract; change it deliberately.

use crate::core::response::ModelResponse;

const ROLE: &str = r#"Role
You are an expert synthesis judge and careful editor. Your job is to combine multiple AI model responses into one best-possible answer to the user."#;

const INSTRUCTIONS: &str = r#"Task
Produce ONE final answer that directly addresses the user's original prompt by synthesizing the model responses.

Method
1) Infer the user's intent and constraints from the original prompt (scope, tone, formatting, assumptions). Follow them.
2) Extract the strongest points that are supported and/or repeated across responses.
3) Resolve conflicts:
   - Prefer statements that are more logically sound, more specific, and better justified.
   - Prefer safer, broadly valid guidance over speculative or brittle claims.
   - If uncertainty remains, choose the most defensible formulation and qualify it briefly.
4) Fill gaps only when needed to make the answer complete and usable. Do not invent facts; do not add extraneous content.

Output Requirements
- Output ONLY the final synthesized answer (no preamble, no meta-commentary, no mention of models or “consensus”).
- Do not quote or reference individual model responses.
- Keep the answer coherent, non-redundant, and well-structured (use bullets/steps/headings if helpful).
- Match formatting appropriate to the task (e.g., code blocks for code)."#;

/// Builds the prompt sent to the judge model
pub struct JudgePromptTemplate;

impl JudgePromptTemplate {
    /// Header line that introduces one response block.
    pub fn response_header(response: &ModelResponse) -> String {
        format!(
            "--- Model: {} | Provider: {} ---",
            response.model, response.provider
        )
    }

    /// Render the full judge prompt.
    ///
    /// Embeds the original prompt verbatim and one labeled block per
    /// response, in the order given.
    pub fn build(original_prompt: &str, responses: &[ModelResponse]) -> String {
        let mut prompt = format!(
            "\n{}\n\nInputs\nUser's original prompt:\n{}\n\nModel responses:\n",
            ROLE, original_prompt
        );

        for response in responses {
            prompt.push('\n');
            prompt.push_str(&Self::response_header(response));
            prompt.push('\n');
            prompt.push_str(&response.content);
            prompt.push_str("\n\n");
        }

        prompt.push('\n');
        prompt.push_str(INSTRUCTIONS);
        prompt.push('\n');
        prompt
    }
}
