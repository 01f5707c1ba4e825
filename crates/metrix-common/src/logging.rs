//! Logging configuration and initialization
//!
//! Every Metrix binary routes its output through `tracing`. This module builds
//! the global subscriber from a [`LogConfig`]:
//!
//! - console, daily-rotated file, or both
//! - human-readable text or JSON lines
//! - a base level plus optional per-target directives (`sqlx=warn,metrix_core=debug`)
//!
//! Library code never prints; it emits structured events instead:
//!
//! ```rust,ignore
//! use tracing::{info, warn};
//!
//! info!(project_id = %project.id, files = total, "Analysis started");
//! warn!(path = %path.display(), error = %err, "Skipping unparseable file");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use metrix_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Minimum severity that reaches the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn wants_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn wants_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" | "stderr" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(anyhow!("Invalid log output: {}", s)),
        }
    }
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogOutput::Console => "console",
            LogOutput::File => "file",
            LogOutput::Both => "both",
        })
    }
}

/// Line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow!("Invalid log format: {}", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub output: LogOutput,
    pub format: LogFormat,

    /// Directory for rotated log files, used when `output` includes a file
    pub log_dir: PathBuf,

    /// File name prefix, e.g. "metrix" -> "metrix.2026-01-18"
    pub log_file_prefix: String,

    /// Extra comma-separated filter directives, e.g. "sqlx=warn"
    pub filter_directives: Option<String>,

    pub include_location: bool,
    pub include_thread_ids: bool,
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "metrix".to_string(),
            filter_directives: None,
            include_location: false,
            include_thread_ids: false,
            include_targets: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `LOG_*` environment variables.
    ///
    /// Recognized: `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`,
    /// `LOG_FILE_PREFIX`, `LOG_FILTER`, `LOG_INCLUDE_LOCATION`,
    /// `LOG_INCLUDE_THREAD_IDS`, `LOG_INCLUDE_TARGETS`. Unset variables keep
    /// their defaults; malformed enum values are errors.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env()
    }

    /// Apply any `LOG_*` variables on top of `self`.
    pub fn overlay_env(mut self) -> Result<Self> {
        if let Some(level) = env_var("LOG_LEVEL") {
            self.level = level.parse()?;
        }
        if let Some(output) = env_var("LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(format) = env_var("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(dir) = env_var("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = env_var("LOG_FILE_PREFIX") {
            self.log_file_prefix = prefix;
        }
        if let Some(filter) = env_var("LOG_FILTER") {
            self.filter_directives = Some(filter);
        }
        self.include_location = env_flag("LOG_INCLUDE_LOCATION", self.include_location);
        self.include_thread_ids = env_flag("LOG_INCLUDE_THREAD_IDS", self.include_thread_ids);
        self.include_targets = env_flag("LOG_INCLUDE_TARGETS", self.include_targets);

        Ok(self)
    }

    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter =
            EnvFilter::from_default_env().add_directive(self.level.to_tracing_level().into());

        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                filter = filter.add_directive(
                    directive
                        .parse()
                        .with_context(|| format!("Invalid filter directive '{}'", directive))?,
                );
            }
        }

        Ok(filter)
    }

    fn layer(&self, writer: BoxMakeWriter, ansi: bool) -> BoxedLayer {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(self.include_targets)
            .with_thread_ids(self.include_thread_ids)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(FmtSpan::CLOSE);

        match self.format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(name: &str, default: bool) -> bool {
    env_var(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_location(mut self, include: bool) -> Self {
        self.config.include_location = include;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Install the global subscriber described by `config`.
///
/// Call once at startup. Fails if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

    if config.output.wants_console() {
        // stderr keeps stdout free for command output (JSON dumps)
        layers.push(config.layer(BoxMakeWriter::new(std::io::stderr), true));
    }

    if config.output.wants_file() {
        std::fs::create_dir_all(&config.log_dir).with_context(|| {
            format!("Failed to create log directory {}", config.log_dir.display())
        })?;

        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        // The worker must outlive every event; there is no shutdown hook to hand it to.
        std::mem::forget(guard);

        layers.push(config.layer(BoxMakeWriter::new(non_blocking), false));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(config.env_filter()?)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_output_selects_sinks() {
        let both: LogOutput = "both".parse().unwrap();
        assert!(both.wants_console() && both.wants_file());

        let file: LogOutput = "file".parse().unwrap();
        assert!(!file.wants_console());
        assert!(file.wants_file());

        assert!("syslog".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::File)
            .format(LogFormat::Json)
            .log_dir("/var/log/metrix")
            .log_file_prefix("metrix-cli")
            .build();

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.output, LogOutput::File);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/metrix"));
        assert_eq!(config.log_file_prefix, "metrix-cli");
    }

    #[test]
    fn test_filter_rejects_bad_directive() {
        let config = LogConfig::builder().filter_directives("sqlx=loud").build();
        assert!(config.env_filter().is_err());

        let config = LogConfig::builder().filter_directives("sqlx=warn, metrix_core=debug").build();
        assert!(config.env_filter().is_ok());
    }
}
