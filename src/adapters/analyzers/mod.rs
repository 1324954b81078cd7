//! Default analyzers backed by text scanning.

pub mod block;
pub mod component;

pub use block::TextBlockAnalyzer;
pub use component::TextComponentAnalyzer;
