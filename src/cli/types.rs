//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use super::commands::analyze::AnalyzeArgs;
use super::commands::cache::CacheArgs;
use super::commands::patterns::PatternsArgs;

#[derive(Parser, Debug)]
#[command(name = "blockaudit")]
#[command(about = "Audit block configs and their UI components", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra configuration file merged over .blockaudit/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze blocks and components and print a report
    Analyze(AnalyzeArgs),

    /// Inspect or clear the result cache
    Cache(CacheArgs),

    /// Work with upstream reference patterns
    Patterns(PatternsArgs),
}
