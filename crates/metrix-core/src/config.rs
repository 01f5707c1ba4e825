//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::db::DbConfig;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/metrix";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default base directory holding one sub-directory per project.
pub const DEFAULT_WORKSPACE_DIR: &str = "./workspace";

/// Default number of artifact records committed together.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default number of files parsed in parallel before their artifacts are queued.
pub const DEFAULT_PARSE_BATCH_SIZE: usize = 64;

/// Default suffix of analyzable source files.
pub const DEFAULT_SOURCE_SUFFIX: &str = ".java";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DbConfig,
    pub workspace: WorkspaceConfig,
    pub pipeline: PipelineConfig,
}

/// Where project archives and extracted sources live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub base_dir: PathBuf,
}

/// Knobs for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Artifact records per persistence unit
    pub chunk_size: usize,
    /// Files handed to the parser pool at once
    pub parse_batch_size: usize,
    /// File-name suffix selecting candidate sources
    pub source_suffix: String,
    /// Run the whole-project pass that fills in NOC
    pub compute_noc: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parse_batch_size: DEFAULT_PARSE_BATCH_SIZE,
            source_suffix: DEFAULT_SOURCE_SUFFIX.to_string(),
            compute_noc: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_parse_batch_size(mut self, parse_batch_size: usize) -> Self {
        self.parse_batch_size = parse_batch_size;
        self
    }

    pub fn with_compute_noc(mut self, compute_noc: bool) -> Self {
        self.compute_noc = compute_noc;
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("Chunk size must be greater than 0");
        }

        if self.parse_batch_size == 0 {
            anyhow::bail!("Parse batch size must be greater than 0");
        }

        if self.source_suffix.trim().is_empty() {
            anyhow::bail!("Source suffix cannot be empty");
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_env();
        config.validate()?;

        Ok(config)
    }

    /// Read the environment without touching `.env` or validating.
    pub fn from_env() -> Self {
        Config {
            database: DbConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_parse("DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: Some(
                    env_parse("DATABASE_IDLE_TIMEOUT").unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
                ),
            },
            workspace: WorkspaceConfig {
                base_dir: std::env::var("METRIX_WORKSPACE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORKSPACE_DIR)),
            },
            pipeline: PipelineConfig {
                chunk_size: env_parse("METRIX_CHUNK_SIZE").unwrap_or(DEFAULT_CHUNK_SIZE),
                parse_batch_size: env_parse("METRIX_PARSE_BATCH_SIZE")
                    .unwrap_or(DEFAULT_PARSE_BATCH_SIZE),
                source_suffix: std::env::var("METRIX_SOURCE_SUFFIX")
                    .unwrap_or_else(|_| DEFAULT_SOURCE_SUFFIX.to_string()),
                compute_noc: env_parse("METRIX_COMPUTE_NOC").unwrap_or(false),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.workspace.base_dir.as_os_str().is_empty() {
            anyhow::bail!("Workspace directory cannot be empty");
        }

        self.pipeline.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            workspace: WorkspaceConfig {
                base_dir: PathBuf::from(DEFAULT_WORKSPACE_DIR),
            },
            pipeline: PipelineConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "DATABASE_URL",
        "DATABASE_MAX_CONNECTIONS",
        "METRIX_WORKSPACE_DIR",
        "METRIX_CHUNK_SIZE",
        "METRIX_SOURCE_SUFFIX",
        "METRIX_COMPUTE_NOC",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.workspace.base_dir, PathBuf::from(DEFAULT_WORKSPACE_DIR));
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgresql://db/metrix_test");
        std::env::set_var("METRIX_WORKSPACE_DIR", "/srv/metrix");
        std::env::set_var("METRIX_CHUNK_SIZE", "25");
        std::env::set_var("METRIX_SOURCE_SUFFIX", ".jav");
        std::env::set_var("METRIX_COMPUTE_NOC", "true");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.database.url, "postgresql://db/metrix_test");
        assert_eq!(config.workspace.base_dir, PathBuf::from("/srv/metrix"));
        assert_eq!(config.pipeline.chunk_size, 25);
        assert_eq!(config.pipeline.source_suffix, ".jav");
        assert!(config.pipeline.compute_noc);
    }

    #[test]
    #[serial]
    fn test_unparseable_number_falls_back_to_default() {
        clear_env();
        std::env::set_var("METRIX_CHUNK_SIZE", "lots");
        let config = Config::from_env();
        clear_env();

        assert_eq!(config.pipeline.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.pipeline.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_suffix() {
        let config = Config {
            pipeline: PipelineConfig {
                source_suffix: "  ".to_string(),
                ..PipelineConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_pool_bounds() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }
}
