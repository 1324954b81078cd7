use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project configuration file, created by hand or by tooling.
pub const PROJECT_CONFIG: &str = ".blockaudit/config.yaml";
/// Optional local overrides, usually not committed.
pub const LOCAL_CONFIG: &str = ".blockaudit/local.yaml";
/// Prefix of environment overrides; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "BLOCKAUDIT_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid {0}: must be greater than 0 seconds")]
    InvalidTtl(&'static str),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid backoff_factor: {0}. Must be at least 1.0")]
    InvalidBackoffFactor(f64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .blockaudit/config.yaml
    /// 3. .blockaudit/local.yaml
    /// 4. Environment variables (BLOCKAUDIT_* prefix)
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Like [`ConfigLoader::load`], with `extra` merged after the project
    /// files and before the environment.
    pub fn load_with(extra: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG))
            .merge(Yaml::file(LOCAL_CONFIG));
        if let Some(path) = extra {
            if !path.exists() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file on top of the defaults only.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.analysis.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(config.analysis.batch_size));
        }

        if config.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl("cache.ttl_secs"));
        }
        if config.reference.cache_ttl_secs == 0 {
            return Err(ConfigError::InvalidTtl("reference.cache_ttl_secs"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }
        if config.retry.backoff_factor.is_nan() || config.retry.backoff_factor < 1.0 {
            return Err(ConfigError::InvalidBackoffFactor(config.retry.backoff_factor));
        }

        for source in &config.reference.sources {
            if source.owner.is_empty() || source.repo.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "reference source '{}' needs both owner and repo",
                    source.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LoggingConfig, RetryConfig};
    use crate::domain::models::{ReferenceSource, SeverityFilter};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.batch_size, 5);
        assert!(config.analysis.continue_on_error);
        assert_eq!(config.cache.ttl_secs, 3_600);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.reference.sources.len(), 2);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
analysis:
  block_dir: app/blocks
  batch_size: 8
  severity: high
cache:
  enabled: false
  ttl_secs: 60
reference:
  sources:
    - name: mine
      owner: acme
      repo: site
      path: src/blocks
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.analysis.block_dir, std::path::PathBuf::from("app/blocks"));
        assert_eq!(config.analysis.batch_size, 8);
        assert_eq!(config.analysis.severity, SeverityFilter::High);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.reference.sources[0].branch, "main");
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = Config::default();
        config.analysis.batch_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_validate_zero_ttls() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTtl("cache.ttl_secs"))
        ));

        let mut config = Config::default();
        config.reference.cache_ttl_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTtl("reference.cache_ttl_secs"))
        ));
    }

    #[test]
    fn test_validate_invalid_logging() {
        let config = Config {
            logging: LoggingConfig {
                level: "verbose".to_string(),
                ..LoggingConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let config = Config {
            logging: LoggingConfig {
                format: "xml".to_string(),
                ..LoggingConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let config = Config {
            retry: RetryConfig {
                initial_backoff_ms: 5_000,
                max_backoff_ms: 1_000,
                ..RetryConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(5_000, 1_000))
        ));

        let config = Config {
            retry: RetryConfig {
                backoff_factor: 0.5,
                ..RetryConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoffFactor(_))
        ));
    }

    #[test]
    fn test_validate_source_without_repo() {
        let mut config = Config::default();
        config.reference.sources.push(ReferenceSource {
            name: "broken".to_string(),
            owner: "acme".to_string(),
            repo: String::new(),
            path: "blocks".to_string(),
            branch: "main".to_string(),
        });
        let err = ConfigLoader::validate(&config).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("BLOCKAUDIT_ANALYSIS__BATCH_SIZE", Some("12")),
                ("BLOCKAUDIT_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config: Config = Figment::new()
                    .merge(Serialized::defaults(Config::default()))
                    .merge(Env::prefixed(ENV_PREFIX).split("__"))
                    .extract()
                    .unwrap();
                assert_eq!(config.analysis.batch_size, 12);
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.cache.ttl_secs, 3_600);
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "analysis:\n  batch_size: 3\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "analysis:\n  batch_size: 9\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.analysis.batch_size, 9, "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache:\n  dir: /tmp/blockaudit-cache\n  ttl_secs: 120").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.cache.dir,
            Some(std::path::PathBuf::from("/tmp/blockaudit-cache"))
        );
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.analysis.batch_size, 5);
    }
}
