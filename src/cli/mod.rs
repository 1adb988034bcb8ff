//! Command-line interface for varmon.
//!
//! Point it at one or more expvar endpoints and it prints their metrics
//! every tick: `varmon --ports 1234-1236 -i 2s`.

use crate::core::config::ConfigBuilder;
use crate::core::{Config, OutputFormat, Result, VarmonError};
use crate::display::{ConsoleRenderer, JsonRenderer};
use crate::metrics::{parse_paths, MetricPath};
use crate::poller::Poller;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Terminal monitor for expvar-style JSON telemetry
#[derive(Parser, Debug)]
#[command(name = "varmon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Ports or addresses to monitor (e.g. `1234`, `1234-1236`, `host:2000`, URLs)
    #[arg(short, long, env = "VARMON_PORTS")]
    pub ports: Option<String>,

    /// Polling interval (e.g. `5s`, `500ms`, `1m`)
    #[arg(short, long, env = "VARMON_INTERVAL")]
    pub interval: Option<humantime::Duration>,

    /// Per-request timeout
    #[arg(long, env = "VARMON_TIMEOUT")]
    pub timeout: Option<humantime::Duration>,

    /// Comma-separated metric paths, optionally prefixed with `mem:`, `duration:` or `str:`
    #[arg(long, env = "VARMON_VARS")]
    pub vars: Option<String>,

    /// Endpoint path for targets without one
    #[arg(long, env = "VARMON_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Configuration file path (default: ~/.config/varmon/config.yaml)
    #[arg(short, long, env = "VARMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print one JSON document per tick instead of status lines
    #[arg(long, env = "VARMON_JSON")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, env = "VARMON_DEBUG")]
    pub debug: bool,

    /// Samples kept per metric
    #[arg(long, env = "VARMON_HISTORY")]
    pub history: Option<usize>,

    /// Bin cap for GC histograms
    #[arg(long, env = "VARMON_BINS")]
    pub bins: Option<usize>,

    /// Cumulative counter whose decrease signals a restart (`none` to disable)
    #[arg(long, env = "VARMON_RESTART_COUNTER")]
    pub restart_counter: Option<String>,

    /// HTTP basic auth user
    #[arg(long, env = "HTTP_USER")]
    pub http_user: Option<String>,

    /// HTTP basic auth password
    #[arg(long, env = "HTTP_PASSWORD", hide_env_values = true)]
    pub http_password: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join("varmon").join("config.yaml"))
                .filter(|p| p.exists()),
        };

        if let Some(path) = config_path {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => builder = builder.from_yaml(&content)?,
                Err(e) => {
                    return Err(VarmonError::config(format!(
                        "Failed to read config file {}: {e}",
                        path.display()
                    )));
                },
            }
        }

        self.apply_args(builder)?.build()
    }

    fn apply_args(&self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if let Some(ports) = &self.ports {
            builder = builder.targets(vec![ports.clone()]);
        }
        if let Some(interval) = self.interval {
            builder = builder.interval(interval.into());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout.into());
        }
        if let Some(vars) = &self.vars {
            builder = builder.vars(parse_paths(vars)?);
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }
        if let Some(history) = self.history {
            builder = builder.history_capacity(history);
        }
        if let Some(bins) = self.bins {
            builder = builder.histogram_bins(bins);
        }
        if let Some(counter) = &self.restart_counter {
            let counter = match counter.trim() {
                "" | "none" => None,
                path => Some(path.parse::<MetricPath>()?),
            };
            builder = builder.restart_counter(counter);
        }
        if let (Some(user), Some(password)) = (&self.http_user, &self.http_password) {
            builder = builder.basic_auth(user.clone(), password.clone());
        }
        if self.json {
            builder = builder.output(OutputFormat::Json);
        }

        Ok(builder.debug(self.debug))
    }

    /// Initialize logging on stderr so it never mixes with rendered output.
    ///
    /// Level precedence: `--debug`, then `VARMON_LOG_LEVEL`, then the
    /// config file.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let log_level = if self.debug {
            "debug".to_string()
        } else {
            std::env::var("VARMON_LOG_LEVEL")
                .unwrap_or_else(|_| config.logging.level.as_str().to_string())
        };

        let filter = EnvFilter::try_new(&log_level)
            .map_err(|e| VarmonError::config(format!("Invalid log level '{log_level}': {e}")))?;

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(self.debug)
            .compact();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| VarmonError::config(format!("Failed to initialize logging: {e}")))?;

        Ok(())
    }
}

/// Execute varmon.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    if cli.check_config {
        let targets = config.resolve_targets()?;
        println!("Configuration is valid!");
        println!("  Interval: {}", humantime::format_duration(config.poll.interval));
        println!("  Timeout: {}", humantime::format_duration(config.poll.timeout));
        println!("  Targets:");
        for target in &targets {
            println!("    {target}");
        }
        println!("  Vars:");
        for var in &config.metrics.vars {
            println!("    {var} ({})", var.kind());
        }
        return Ok(());
    }

    let mut poller = Poller::from_config(&config)?;
    info!(
        instances = poller.instances().len(),
        interval = %humantime::format_duration(poller.interval()),
        vars = config.metrics.vars.len(),
        "Starting varmon"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    match config.output.format {
        OutputFormat::Console => {
            poller
                .run(&mut ConsoleRenderer::new(std::io::stdout()), shutdown)
                .await
        },
        OutputFormat::Json => {
            poller
                .run(&mut JsonRenderer::new(std::io::stdout()), shutdown)
                .await
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Kind;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("varmon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_overrides() {
        let cli = parse(&[
            "--ports",
            "1234-1235",
            "-i",
            "2s",
            "--vars",
            "mem:memstats.Alloc,goroutines",
            "--bins",
            "10",
            "--restart-counter",
            "none",
            "--json",
        ]);

        let config = cli.apply_args(ConfigBuilder::new()).unwrap().build().unwrap();
        assert_eq!(config.poll.interval, Duration::from_secs(2));
        assert_eq!(config.metrics.vars.len(), 2);
        assert_eq!(config.metrics.vars[0].kind(), Kind::Memory);
        assert_eq!(config.metrics.histogram_bins, 10);
        assert!(config.metrics.restart_counter.is_none());
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.resolve_targets().unwrap().len(), 2);
    }

    #[test]
    fn test_basic_auth_needs_both_parts() {
        let cli = parse(&["--ports", "1234", "--http-user", "admin"]);
        let config = cli.apply_args(ConfigBuilder::new()).unwrap().build().unwrap();
        assert!(config.poll.basic_auth.is_none());

        let cli = parse(&["--ports", "1234", "--http-user", "admin", "--http-password", "pw"]);
        let config = cli.apply_args(ConfigBuilder::new()).unwrap().build().unwrap();
        assert_eq!(config.poll.basic_auth.map(|a| a.user), Some("admin".to_string()));
    }

    #[test]
    fn test_invalid_vars_rejected() {
        let cli = parse(&["--vars", ",,"]);
        assert!(cli.apply_args(ConfigBuilder::new()).is_err());
    }

    #[test]
    fn test_invalid_interval_rejected_by_clap() {
        assert!(Cli::try_parse_from(["varmon", "-i", "soon"]).is_err());
    }
}
