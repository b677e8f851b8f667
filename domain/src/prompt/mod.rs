//! Prompt construction for the judge step.

pub mod template;

pub use template::JudgePromptTemplate;
