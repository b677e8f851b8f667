//! Consensus subdomain: the final, externally visible artifact of a run.

pub mod result;
