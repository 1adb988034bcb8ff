//! Tick loop.
//!
//! Every tick fans out one refresh per instance and joins all of them
//! before anything is published, so a renderer never sees a half-updated
//! tick. Each refresh touches only its own [`InstanceState`]; the join is
//! the only synchronization point.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::{Config, Result};
use crate::display::Renderer;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::instance::{InstanceOptions, InstanceSnapshot, InstanceState};

/// Aggregate state of every instance after one tick.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// When the tick's join barrier completed.
    pub taken_at: DateTime<Utc>,
    /// Instances in configuration order.
    pub instances: Vec<InstanceSnapshot>,
}

/// Drives the per-tick refresh of all instances.
pub struct Poller {
    instances: Vec<InstanceState>,
    fetcher: Arc<dyn Fetcher>,
    interval: Duration,
}

impl Poller {
    /// Create a poller over prepared instances.
    pub fn new(instances: Vec<InstanceState>, fetcher: Arc<dyn Fetcher>, interval: Duration) -> Self {
        Self {
            instances,
            fetcher,
            interval,
        }
    }

    /// Build instances and an HTTP fetcher from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let targets = config.resolve_targets()?;
        let options = InstanceOptions {
            history_capacity: config.metrics.history_capacity,
            histogram_bins: config.metrics.histogram_bins,
            restart_counter: config.metrics.restart_counter.clone(),
        };

        let instances = targets
            .into_iter()
            .map(|target| InstanceState::new(target, &config.metrics.vars, options.clone()))
            .collect();
        let fetcher = Arc::new(HttpFetcher::from_config(&config.poll)?);

        Ok(Self::new(instances, fetcher, config.poll.interval))
    }

    /// Monitored instances.
    pub fn instances(&self) -> &[InstanceState] {
        &self.instances
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Refresh every instance concurrently and wait for all of them.
    pub async fn tick(&mut self) -> Snapshot {
        let fetcher = self.fetcher.as_ref();
        join_all(
            self.instances
                .iter_mut()
                .map(|instance| instance.refresh(fetcher)),
        )
        .await;

        let snapshot = Snapshot {
            taken_at: Utc::now(),
            instances: self.instances.iter().map(InstanceState::snapshot).collect(),
        };
        debug!(instances = snapshot.instances.len(), "Tick complete");
        snapshot
    }

    /// Tick now and then every interval until `shutdown` resolves.
    ///
    /// A tick that overruns the interval delays the next one; ticks never
    /// overlap or queue up.
    pub async fn run<R, F>(&mut self, renderer: &mut R, shutdown: F) -> Result<()>
    where
        R: Renderer + ?Sized,
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("Shutdown requested, stopping poller");
                    break;
                },
                _ = ticker.tick() => {
                    let snapshot = self.tick().await;
                    renderer.update(&snapshot)?;
                },
            }
        }

        Ok(())
    }
}
