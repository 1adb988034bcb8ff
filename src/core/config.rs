//! Configuration management for varmon.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable and CLI argument overrides (see `cli`)
//! - Validation and defaults

use crate::core::target::{parse_targets, Target, DEFAULT_ENDPOINT};
use crate::core::{Result, VarmonError};
use crate::metrics::{MetricPath, DEFAULT_BINS, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vars monitored when none are configured.
pub const DEFAULT_VARS: &[&str] = &[
    "mem:memstats.Alloc",
    "mem:memstats.Sys",
    "mem:memstats.HeapAlloc",
    "mem:memstats.HeapInuse",
    "memstats.PauseNs",
    "memstats.PauseEnd",
    "duration:memstats.PauseTotalNs",
];

/// Cumulative counter watched for restarts when none is configured.
pub const DEFAULT_RESTART_COUNTER: &str = "memstats.PauseTotalNs";

/// Complete configuration for varmon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Polling configuration
    pub poll: PollConfig,
    /// Instances to monitor, as target strings (`1234`, `host:80-81`, URLs)
    pub targets: Vec<String>,
    /// Metric selection and history sizing
    pub metrics: MetricsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Time between ticks
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Path appended to targets that do not carry their own
    pub endpoint: String,
    /// Optional HTTP basic auth credentials
    pub basic_auth: Option<BasicAuth>,
}

/// HTTP basic auth credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// User name
    pub user: String,
    /// Password
    pub password: String,
}

/// Metric selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Metric paths to monitor
    pub vars: Vec<MetricPath>,
    /// Samples kept per metric
    pub history_capacity: usize,
    /// Bin cap for GC histograms
    pub histogram_bins: usize,
    /// Cumulative counter whose decrease signals a restart
    pub restart_counter: Option<MetricPath>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Renderer used for each tick
    pub format: OutputFormat,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One status line per instance
    Console,
    /// One JSON document per tick
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            poll: PollConfig::default(),
            targets: Vec::new(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
            debug: false,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(1),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            basic_auth: None,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            vars: DEFAULT_VARS.iter().map(|v| MetricPath::new(*v)).collect(),
            history_capacity: DEFAULT_CAPACITY,
            histogram_bins: DEFAULT_BINS,
            restart_counter: Some(MetricPath::new(DEFAULT_RESTART_COUNTER)),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: OutputFormat::Console,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval.is_zero() {
            return Err(VarmonError::config(
                "poll interval must be greater than 0 (examples: 5s, 1m, 1h30m)",
            ));
        }

        if self.poll.timeout.is_zero() {
            return Err(VarmonError::config("poll timeout must be greater than 0"));
        }

        if !self.poll.endpoint.starts_with('/') {
            return Err(VarmonError::config(format!(
                "endpoint must start with '/', got '{}'",
                self.poll.endpoint
            )));
        }

        if self.metrics.vars.is_empty() {
            return Err(VarmonError::config("no vars specified"));
        }

        for var in &self.metrics.vars {
            if var.segments().is_empty() {
                return Err(VarmonError::config(format!("metric path '{var}' has no segments")));
            }
        }

        if self.metrics.history_capacity == 0 {
            return Err(VarmonError::config("history_capacity must be greater than 0"));
        }

        if self.metrics.histogram_bins == 0 {
            return Err(VarmonError::config("histogram_bins must be greater than 0"));
        }

        Ok(())
    }

    /// Expand the configured target strings
    pub fn resolve_targets(&self) -> Result<Vec<Target>> {
        let mut targets = Vec::new();
        for entry in &self.targets {
            targets.extend(parse_targets(entry, &self.poll.endpoint)?);
        }

        if targets.is_empty() {
            return Err(VarmonError::config(
                "no ports specified. Use --ports to specify instances to monitor",
            ));
        }
        Ok(targets)
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| VarmonError::config(format!("Failed to parse YAML config: {e}")))?;
        Ok(self)
    }

    /// Set polling interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.poll.interval = interval;
        self
    }

    /// Set per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.poll.timeout = timeout;
        self
    }

    /// Set endpoint path
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.poll.endpoint = endpoint.into();
        self
    }

    /// Set basic auth credentials
    pub fn basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.poll.basic_auth = Some(BasicAuth {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// Add a target string
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.config.targets.push(target.into());
        self
    }

    /// Replace all target strings
    pub fn targets(mut self, targets: Vec<String>) -> Self {
        self.config.targets = targets;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Replace the monitored vars
    pub fn vars(mut self, vars: Vec<MetricPath>) -> Self {
        self.config.metrics.vars = vars;
        self
    }

    /// Set samples kept per metric
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.metrics.history_capacity = capacity;
        self
    }

    /// Set GC histogram bin cap
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.config.metrics.histogram_bins = bins;
        self
    }

    /// Set the restart counter path
    pub fn restart_counter(mut self, path: Option<MetricPath>) -> Self {
        self.config.metrics.restart_counter = path;
        self
    }

    /// Set output format
    pub fn output(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
