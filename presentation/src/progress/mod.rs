//! Live progress display

pub mod reporter;
