//! Domain layer for blockaudit
//!
//! This module contains the pipeline's data model, error types and the port
//! traits its collaborators implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{AnalyzerError, DomainError, DomainResult, FetchError};
