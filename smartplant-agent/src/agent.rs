//! Cooperative scheduling loop
//!
//! One logical thread of control. Each pass reads the clock once, then in
//! order: sanitise the runtime state, refresh config if due, run a sample
//! cycle if due, and repair connectivity. Every step is awaited to
//! completion before the next one starts, so no two cycles ever overlap and
//! `RuntimeConfig` needs no locking.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::cycle::{CycleReport, SampleCycleController};
use crate::dispatch::DeliveryDispatcher;
use crate::drivers::{ConfigSource, Link, PublishChannel, RequestChannel, Sensor, StatusIndicator};
use crate::model::HealthStatus;
use crate::reconfig::{ReconfigurationScheduler, RefreshOutcome};
use crate::runtime::{elapsed_millis, Clock, RuntimeConfig};

/// Everything the agent talks to.
pub struct Collaborators {
    pub sensor: Box<dyn Sensor>,
    pub link: Box<dyn Link>,
    pub request: Box<dyn RequestChannel>,
    pub publish: Box<dyn PublishChannel>,
    pub config_source: Box<dyn ConfigSource>,
    pub indicator: Box<dyn StatusIndicator>,
    pub clock: Box<dyn Clock>,
}

/// What happened during one scheduling pass.
#[derive(Debug, Default)]
pub struct PassReport {
    pub interval_reset: bool,
    pub refresh: Option<RefreshOutcome>,
    pub cycle: Option<CycleReport>,
}

pub struct Agent {
    runtime: RuntimeConfig,
    cycle: SampleCycleController,
    reconfig: ReconfigurationScheduler,
    clock: Box<dyn Clock>,
    idle: Duration,
    broker_retry_millis: u32,
    last_broker_attempt: Option<u32>,
}

impl Agent {
    pub fn new(config: &AgentConfig, client_id: String, parts: Collaborators) -> Self {
        let dispatcher = DeliveryDispatcher::new(config.channel_config(client_id), parts.request, parts.publish);
        let cycle = SampleCycleController::new(
            config.device.clone(),
            config.thresholds.clone(),
            parts.sensor,
            parts.link,
            dispatcher,
            parts.indicator,
        );
        let reconfig = ReconfigurationScheduler::new(
            parts.config_source,
            config.remote_config.enabled,
            config.refresh_period_millis(),
        );
        let runtime = RuntimeConfig::new(config.sampling_interval(), parts.clock.now_millis());

        Self {
            runtime,
            cycle,
            reconfig,
            clock: parts.clock,
            idle: Duration::from_millis(config.sampling.idle_millis),
            broker_retry_millis: u32::try_from(config.mqtt.retry_secs.saturating_mul(1000)).unwrap_or(u32::MAX),
            last_broker_attempt: None,
        }
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    pub fn status(&self) -> HealthStatus {
        self.cycle.status()
    }

    /// Boot sequence: Idle, bring the link up, fetch the interval once.
    pub async fn start(&mut self) {
        info!(
            interval_secs = self.runtime.sampling_interval_secs(),
            "starting SmartPlant agent"
        );
        self.cycle.show(HealthStatus::Idle);

        if !self.cycle.link_connected() {
            let _ = self.cycle.reconnect_link().await;
        }

        if let RefreshOutcome::Applied(interval) = self.reconfig.refresh(&mut self.runtime).await {
            info!(secs = interval.secs(), "initial sampling interval from backend");
        }
        self.runtime.mark_config_fetched(self.clock.now_millis());
    }

    /// One scheduling pass.
    pub async fn tick(&mut self) -> PassReport {
        let now = self.clock.now_millis();
        let interval_reset = self.runtime.sanitize();

        let refresh = self.reconfig.poll(&mut self.runtime, now).await;
        let cycle = self.cycle.poll(&mut self.runtime, now).await;
        self.maintain_connectivity(now).await;

        PassReport { interval_reset, refresh, cycle }
    }

    async fn maintain_connectivity(&mut self, now: u32) {
        if !self.cycle.link_connected() && self.cycle.reconnect_link().await.is_err() {
            return;
        }

        if !self.cycle.broker_needs_connect() {
            return;
        }
        let retry_due = self
            .last_broker_attempt
            .map_or(true, |last| elapsed_millis(now, last) >= self.broker_retry_millis);
        if retry_due {
            self.last_broker_attempt = Some(now);
            let _ = self.cycle.reconnect_broker().await;
        }
    }

    /// Run passes until `shutdown` resolves. Shutdown is only observed
    /// between passes; a running cycle always completes.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.start().await;
        tokio::pin!(shutdown);

        loop {
            self.tick().await;
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("shutdown requested, leaving scheduling loop");
                    break;
                }
                _ = tokio::time::sleep(self.idle) => {}
            }
        }
    }
}
