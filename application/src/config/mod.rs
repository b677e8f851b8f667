//! Application-level configuration.
//!
//! - [`RunParams`]: which models to query, which one judges, and how long
//!   each model may take

pub mod run_params;

pub use run_params::{DEFAULT_TIMEOUT, RunParams};
