//! Domain layer for llm-consensus
//!
//! This crate contains the core entities and value objects. It has no
//! dependencies on runtime, I/O, or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Run**: one prompt fanned out to several models. Every requested model
//!   either answers ([`ModelResponse`]) or is recorded as failed with a
//!   warning ([`RunResult`]).
//! - **Judge**: a designated model that reconciles the answers into one,
//!   driven by [`JudgePromptTemplate`].
//! - **Consensus**: the final record handed to persistence and scripts
//!   ([`ConsensusResult`]).

pub mod config;
pub mod consensus;
pub mod core;
pub mod prompt;
pub mod run;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consensus::result::ConsensusResult;
pub use core::{error::DomainError, request::QueryRequest, response::ModelResponse};
pub use prompt::JudgePromptTemplate;
pub use run::{
    result::RunResult,
    state::{ModelQueryState, QueryStateBoard, QueryStatus},
};
