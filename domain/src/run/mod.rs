//! Run subdomain: the outcome of fanning one prompt out to many models.
//!
//! - [`result::RunResult`]: successes, warnings and failed models of one run
//! - [`state::ModelQueryState`]: transient per-model progress for UIs

pub mod result;
pub mod state;
