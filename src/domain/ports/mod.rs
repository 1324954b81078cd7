//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the pipeline consumes:
//! - Clock: current time and sleeping
//! - FileStatProvider: source file mtime/size
//! - BlockAnalyzer / ComponentAnalyzer: per-file checks
//! - ReferenceApi: upstream reference repositories
//!
//! Adapters in `crate::adapters` implement them; tests substitute their own.

pub mod analyzer;
pub mod clock;
pub mod file_stat;
pub mod reference_api;

pub use analyzer::{BlockAnalyzer, ComponentAnalyzer};
pub use clock::Clock;
pub use file_stat::{FileMetadata, FileStatProvider};
pub use reference_api::{ApiResponse, ReferenceApi};
