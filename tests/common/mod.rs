//! Common test utilities and fixtures.

#![allow(dead_code)]

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use varmon_lib::fetch::HttpFetcher;
use varmon_lib::instance::{InstanceOptions, InstanceState};
use varmon_lib::metrics::MetricPath;
use varmon_lib::core::{parse_targets, DEFAULT_ENDPOINT};
use varmon_lib::Poller;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Expvar payload of a Go service that has run 153 GCs.
pub const EXPVARS: &str = include_str!("../fixtures/expvars.json");

/// Parsed [`EXPVARS`].
pub fn expvars() -> Value {
    serde_json::from_str(EXPVARS).expect("fixture is valid JSON")
}

/// Same payload with `memstats.PauseTotalNs` replaced.
pub fn expvars_with_pause_total(pause_total_ns: u64) -> Value {
    let mut payload = expvars();
    payload["memstats"]["PauseTotalNs"] = Value::from(pause_total_ns);
    payload
}

/// Metric paths used across integration tests.
pub fn default_paths() -> Vec<MetricPath> {
    [
        "mem:memstats.Alloc",
        "duration:memstats.PauseTotalNs",
        "memstats.PauseNs",
        "memstats.PauseEnd",
        "goroutines",
        "counters.A",
        r"bleve.indexes.bench\.bleve.index.lookup_queue_len",
        "str:build.version",
        "missing.metric",
    ]
    .iter()
    .map(|p| MetricPath::new(*p))
    .collect()
}

/// Options that watch the GC pause total for restarts.
pub fn restart_options() -> InstanceOptions {
    InstanceOptions {
        history_capacity: 16,
        restart_counter: Some(MetricPath::new("memstats.PauseTotalNs")),
        ..InstanceOptions::default()
    }
}

/// Mount a `/debug/vars` handler answering with `payload`.
pub async fn serve_vars(server: &MockServer, payload: Value) {
    Mock::given(method("GET"))
        .and(path(DEFAULT_ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(server)
        .await;
}

/// Instance pointed at a mock server's `/debug/vars`.
pub fn instance_for(server: &MockServer, options: InstanceOptions) -> InstanceState {
    let target = parse_targets(&server.uri(), DEFAULT_ENDPOINT)
        .expect("mock server URI is a valid target")
        .remove(0);
    InstanceState::new(target, &default_paths(), options)
}

/// HTTP fetcher with a short timeout for tests.
pub fn fetcher() -> HttpFetcher {
    HttpFetcher::new(Duration::from_millis(500), None).expect("client builds")
}

/// Poller over one instance per mock server.
pub fn poller_for(servers: &[&MockServer]) -> Poller {
    let instances = servers
        .iter()
        .map(|server| instance_for(server, restart_options()))
        .collect();
    Poller::new(instances, Arc::new(fetcher()), Duration::from_millis(50))
}
