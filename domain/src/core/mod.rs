//! Core domain concepts shared across all subdomains.
//!
//! - [`request::QueryRequest`]: one (model, prompt) pair sent to a provider
//! - [`response::ModelResponse`]: a provider's successful answer
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod request;
pub mod response;
