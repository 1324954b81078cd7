//! Infrastructure adapters for external systems.

pub mod analyzers;
pub mod github;
pub mod system;
