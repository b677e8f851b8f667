//! Command-line interface definitions

pub mod commands;
pub mod prompt;
