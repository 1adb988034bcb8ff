//! Per-instance refresh state.
//!
//! Each monitored process owns one [`InstanceState`]: the typed value and
//! history of every configured metric, plus the outcome of the last refresh
//! cycle. A cycle is `Idle -> Fetching -> {Updated, Failed}`; network
//! waiting happens inside the [`Fetcher`], this type only records results.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::core::{Result, Target, VarmonError};
use crate::fetch::Fetcher;
use crate::metrics::{
    DistributionHistogram, HistoryBuffer, Kind, MetricPath, MetricValue, DEFAULT_BINS,
    DEFAULT_CAPACITY,
};

/// Outcome of the current refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    /// Never refreshed.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The last fetch succeeded and values were applied.
    Updated,
    /// The last fetch failed; values keep their previous contents.
    Failed,
}

/// Per-instance tuning, shared by every instance of one run.
#[derive(Debug, Clone)]
pub struct InstanceOptions {
    /// Samples kept per metric.
    pub history_capacity: usize,
    /// Bin cap for GC histograms handed to the display.
    pub histogram_bins: usize,
    /// Cumulative counter whose decrease signals a restart.
    pub restart_counter: Option<MetricPath>,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            histogram_bins: DEFAULT_BINS,
            restart_counter: None,
        }
    }
}

/// One metric of one instance: current value plus its history.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    path: MetricPath,
    value: MetricValue,
    history: HistoryBuffer,
}

impl MetricSeries {
    fn new(path: MetricPath, capacity: usize) -> Self {
        Self {
            value: MetricValue::for_path(&path),
            history: HistoryBuffer::new(capacity),
            path,
        }
    }

    /// Configured path.
    pub fn path(&self) -> &MetricPath {
        &self.path
    }

    /// Current value.
    pub fn value(&self) -> &MetricValue {
        &self.value
    }

    /// Sample history.
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    fn apply(&mut self, payload: &Value) {
        match resolve(payload, &self.path) {
            Some(raw) => {
                if !self.value.set(raw) {
                    return;
                }
                if let Some(sample) = self.value.history_sample() {
                    self.history.push(sample);
                }
            },
            None => self.value.set_unavailable(),
        }
    }

    fn snapshot(&self) -> MetricSnapshot {
        let sparkline = self.path.kind().is_sparkline_capable();
        MetricSnapshot {
            name: self.path.long_name().to_string(),
            label: self.path.short_name(),
            kind: self.path.kind(),
            available: self.value.is_available(),
            value: self.value.to_string(),
            series: if sparkline {
                self.history.int_values()
            } else {
                Vec::new()
            },
            max: if sparkline {
                self.history.max().map(|max| self.value.format_sample(max))
            } else {
                None
            },
        }
    }
}

/// Walk the payload along the path's segments, through objects only.
fn resolve<'a>(payload: &'a Value, path: &MetricPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(payload, |node, segment| node.as_object()?.get(segment))
}

/// Everything varmon tracks about one monitored process.
#[derive(Debug, Clone)]
pub struct InstanceState {
    target: Target,
    name: Option<String>,
    cmdline: Vec<String>,
    metrics: Vec<MetricSeries>,
    options: InstanceOptions,
    state: RefreshState,
    previous: RefreshState,
    restarted: bool,
    last_counter: Option<i64>,
    last_error: Option<String>,
}

impl InstanceState {
    /// Create an idle instance with one series per metric path.
    pub fn new(target: Target, paths: &[MetricPath], options: InstanceOptions) -> Self {
        let metrics = paths
            .iter()
            .map(|path| MetricSeries::new(path.clone(), options.history_capacity))
            .collect();

        Self {
            target,
            name: None,
            cmdline: Vec::new(),
            metrics,
            options,
            state: RefreshState::Idle,
            previous: RefreshState::Idle,
            restarted: false,
            last_counter: None,
            last_error: None,
        }
    }

    /// Polled target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Base name of the process binary, or the address until first read.
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.target.address())
    }

    /// Full command line as reported by the process.
    pub fn cmdline(&self) -> &[String] {
        &self.cmdline
    }

    /// Current refresh state.
    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Whether the latest cycle detected a restart.
    pub fn restarted(&self) -> bool {
        self.restarted
    }

    /// Error of the latest cycle, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// All metric series in configuration order.
    pub fn metrics(&self) -> &[MetricSeries] {
        &self.metrics
    }

    /// Series whose path (without kind prefix) is `long_name`.
    pub fn metric(&self, long_name: &str) -> Option<&MetricSeries> {
        self.metrics.iter().find(|m| m.path.long_name() == long_name)
    }

    /// Histogram over a GC metric with the configured bin cap.
    pub fn histogram(&self, long_name: &str) -> Option<DistributionHistogram> {
        self.metric(long_name)?
            .value
            .histogram(self.options.histogram_bins)
    }

    /// Enter `Fetching`, remembering how the previous cycle ended.
    pub fn begin_fetch(&mut self) {
        if self.state != RefreshState::Fetching {
            self.previous = self.state;
        }
        self.state = RefreshState::Fetching;
    }

    /// Record the outcome of a fetch and end the cycle.
    pub fn apply(&mut self, result: Result<Value>) {
        if self.state != RefreshState::Fetching {
            self.begin_fetch();
        }

        let payload = match result {
            Ok(payload) if payload.is_object() => payload,
            Ok(_) => {
                self.fail(&VarmonError::invalid_payload("telemetry is not a JSON object"));
                return;
            },
            Err(e) => {
                self.fail(&e);
                return;
            },
        };

        if self.name.is_none() {
            self.resolve_identity(&payload);
        }

        for metric in &mut self.metrics {
            metric.apply(&payload);
        }

        let counter_dropped = self.observe_counter(&payload);
        self.restarted = self.previous == RefreshState::Failed || counter_dropped;
        self.state = RefreshState::Updated;
        self.last_error = None;

        if self.restarted {
            info!(instance = %self.target, name = %self.name(), "Restart detected");
        } else {
            debug!(instance = %self.target, metrics = self.metrics.len(), "Instance updated");
        }
    }

    /// Run one full cycle against the fetcher.
    pub async fn refresh(&mut self, fetcher: &dyn Fetcher) {
        self.begin_fetch();
        let result = fetcher.fetch(&self.target).await;
        self.apply(result);
    }

    fn fail(&mut self, error: &VarmonError) {
        warn!(
            instance = %self.target,
            category = error.category(),
            error = %error,
            "Fetch failed"
        );
        self.state = RefreshState::Failed;
        self.restarted = false;
        self.last_error = Some(error.to_string());
    }

    fn resolve_identity(&mut self, payload: &Value) {
        let Some(args) = payload.get("cmdline").and_then(Value::as_array) else {
            return;
        };
        self.cmdline = args
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        self.name = self.cmdline.first().map(|binary| {
            Path::new(binary)
                .file_name()
                .map_or_else(|| binary.clone(), |n| n.to_string_lossy().into_owned())
        });
    }

    /// Track the restart counter; true when it went backwards.
    #[allow(clippy::cast_possible_truncation)]
    fn observe_counter(&mut self, payload: &Value) -> bool {
        let Some(path) = &self.options.restart_counter else {
            return false;
        };
        let Some(current) = resolve(payload, path)
            .and_then(|raw| raw.as_i64().or_else(|| raw.as_f64().map(|f| f as i64)))
        else {
            return false;
        };

        let dropped = self.last_counter.is_some_and(|last| current < last);
        self.last_counter = Some(current);
        dropped
    }

    /// Immutable view handed to renderers.
    pub fn snapshot(&self) -> InstanceSnapshot {
        let status = match self.state {
            RefreshState::Idle | RefreshState::Fetching => Status::Pending,
            RefreshState::Updated if self.restarted => Status::Restarted,
            RefreshState::Updated => Status::Ok,
            RefreshState::Failed => {
                Status::Failed(self.last_error.clone().unwrap_or_default())
            },
        };

        InstanceSnapshot {
            name: self.name(),
            address: self.target.to_string(),
            cmdline: self.cmdline.clone(),
            status,
            metrics: self.metrics.iter().map(MetricSeries::snapshot).collect(),
        }
    }
}

/// Display status of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum Status {
    /// Not refreshed yet.
    Pending,
    /// Latest refresh succeeded.
    Ok,
    /// Latest refresh succeeded and the process restarted since the one before.
    Restarted,
    /// Latest refresh failed.
    Failed(String),
}

/// Render-ready state of one instance after a tick.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSnapshot {
    /// Display name.
    pub name: String,
    /// Polled URL.
    pub address: String,
    /// Command line reported by the process.
    pub cmdline: Vec<String>,
    /// Outcome of the latest cycle.
    pub status: Status,
    /// Metrics in configuration order.
    pub metrics: Vec<MetricSnapshot>,
}

/// Render-ready state of one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    /// Path without kind prefix.
    pub name: String,
    /// Last path segment.
    pub label: String,
    /// Semantic kind.
    pub kind: Kind,
    /// Whether the latest read found the metric.
    pub available: bool,
    /// Kind-aware formatted value.
    pub value: String,
    /// Integer series for sparklines, oldest first.
    pub series: Vec<i64>,
    /// Formatted running maximum.
    pub max: Option<String>,
}
