//! `blockaudit patterns`: fetch upstream reference units.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::system::SystemClock;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::service::build_pattern_fetcher;
use crate::domain::models::{Config, ReferenceUnit};

#[derive(Args, Debug)]
pub struct PatternsArgs {
    #[command(subcommand)]
    pub command: PatternsCommands,
}

#[derive(Subcommand, Debug)]
pub enum PatternsCommands {
    /// Fetch reference units from every configured source
    Fetch {
        /// Only fetch the source with this name
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct FailedSource {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct PatternsOutput {
    pub units: Vec<ReferenceUnit>,
    pub failed_sources: Vec<FailedSource>,
}

impl CommandOutput for PatternsOutput {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();
        if self.units.is_empty() {
            sections.push("No reference units found.".to_string());
        } else {
            sections.push(format!("Fetched {} reference unit(s):", self.units.len()));
            sections.push(TableFormatter::new().format_reference_units(&self.units));
        }
        for failed in &self.failed_sources {
            sections.push(format!("Source '{}' failed: {}", failed.name, failed.error));
        }
        sections.join("\n")
    }
}

pub async fn execute(args: PatternsArgs, config: &Config, json: bool) -> Result<()> {
    match args.command {
        PatternsCommands::Fetch { source } => {
            let mut config = config.clone();
            if let Some(name) = &source {
                config.reference.sources.retain(|s| &s.name == name);
                if config.reference.sources.is_empty() {
                    anyhow::bail!("no reference source named '{name}' is configured");
                }
            }

            let fetcher = build_pattern_fetcher(&config, Arc::new(SystemClock));
            let report = fetcher.fetch_all().await;
            let result = PatternsOutput {
                units: report.units,
                failed_sources: report
                    .failures
                    .into_iter()
                    .map(|failure| FailedSource {
                        name: failure.source.name,
                        error: failure.error.to_string(),
                    })
                    .collect(),
            };
            output(&result, json);
        }
    }
    Ok(())
}
