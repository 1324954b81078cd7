//! `blockaudit cache`: inspect or clear the result cache.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::service::build_orchestrator;
use crate::domain::models::{CacheSettings, CacheStats, Config, WorkItemKind};
use crate::services::ProgressReporter;

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache counters and the number of results on disk
    Stats {
        /// Cache directory (defaults to cache.dir from configuration)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Remove every cached result, in memory and on disk
    Clear {
        /// Cache directory (defaults to cache.dir from configuration)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
pub struct CacheStatsOutput {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub indexed_blocks: Vec<String>,
    pub indexed_components: Vec<String>,
}

impl CommandOutput for CacheStatsOutput {
    fn to_human(&self) -> String {
        let location = self
            .stats
            .disk_dir
            .as_deref()
            .map_or_else(|| "memory only".to_string(), |dir| format!("disk: {dir}"));
        format!(
            "Result cache ({location})\n{}",
            TableFormatter::new().format_cache_stats(
                &self.stats,
                self.indexed_blocks.len(),
                self.indexed_components.len()
            )
        )
    }
}

#[derive(Debug, Serialize)]
pub struct CacheClearOutput {
    pub cleared: bool,
    pub disk_dir: Option<String>,
    pub removed_blocks: usize,
    pub removed_components: usize,
}

impl CommandOutput for CacheClearOutput {
    fn to_human(&self) -> String {
        match &self.disk_dir {
            Some(dir) => format!(
                "Cleared {} block and {} component result(s) from {dir}",
                self.removed_blocks, self.removed_components
            ),
            None => "No disk cache configured; nothing to clear.".to_string(),
        }
    }
}

fn settings_for(config: &Config, cache_dir: Option<PathBuf>) -> CacheSettings {
    let mut settings = config.cache_settings();
    if cache_dir.is_some() {
        settings.dir = cache_dir;
    }
    settings
}

pub async fn execute(args: CacheArgs, config: &Config, json: bool) -> Result<()> {
    match args.command {
        CacheCommands::Stats { cache_dir } => {
            let orchestrator = build_orchestrator(
                config,
                settings_for(config, cache_dir),
                ProgressReporter::disabled(),
            );
            let result = CacheStatsOutput {
                stats: orchestrator.cache_stats().await,
                indexed_blocks: orchestrator.indexed_paths(WorkItemKind::Block).await,
                indexed_components: orchestrator.indexed_paths(WorkItemKind::Component).await,
            };
            output(&result, json);
        }
        CacheCommands::Clear { cache_dir } => {
            let orchestrator = build_orchestrator(
                config,
                settings_for(config, cache_dir),
                ProgressReporter::disabled(),
            );
            let removed_blocks = orchestrator.indexed_paths(WorkItemKind::Block).await.len();
            let removed_components = orchestrator
                .indexed_paths(WorkItemKind::Component)
                .await
                .len();
            let stats = orchestrator.cache_stats().await;
            orchestrator.clear_cache().await;
            let result = CacheClearOutput {
                cleared: true,
                disk_dir: stats.disk_dir,
                removed_blocks,
                removed_components,
            };
            output(&result, json);
        }
    }
    Ok(())
}
