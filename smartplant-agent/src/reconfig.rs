//! Periodic refresh of the sampling interval from the backend
//!
//! Best effort: a failed fetch or a rejected body leaves the running
//! interval untouched. A new interval only changes the next trigger check;
//! the sample timer itself is never reset here.

use tracing::{debug, info, warn};

use crate::drivers::ConfigSource;
use crate::error::{ConfigParseError, TransportError};
use crate::interval::{self, SamplingInterval};
use crate::runtime::RuntimeConfig;

/// What a refresh attempt did to the runtime state.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied(SamplingInterval),
    Unchanged(SamplingInterval),
    FetchFailed(TransportError),
    Rejected(ConfigParseError),
    Disabled,
}

pub struct ReconfigurationScheduler {
    source: Box<dyn ConfigSource>,
    enabled: bool,
    period_millis: u32,
}

impl ReconfigurationScheduler {
    pub fn new(source: Box<dyn ConfigSource>, enabled: bool, period_millis: u32) -> Self {
        Self { source, enabled, period_millis }
    }

    pub fn period_millis(&self) -> u32 {
        self.period_millis
    }

    pub fn is_due(&self, runtime: &RuntimeConfig, now: u32) -> bool {
        self.enabled && runtime.config_fetch_due(now, self.period_millis)
    }

    /// Refresh if the cadence has elapsed at `now`.
    pub async fn poll(&mut self, runtime: &mut RuntimeConfig, now: u32) -> Option<RefreshOutcome> {
        if !self.is_due(runtime, now) {
            return None;
        }
        let outcome = self.refresh(runtime).await;
        runtime.mark_config_fetched(now);
        Some(outcome)
    }

    /// Fetch, validate and apply the interval. Does not touch the refresh
    /// timer; `poll` stamps it.
    pub async fn refresh(&mut self, runtime: &mut RuntimeConfig) -> RefreshOutcome {
        if !self.enabled {
            return RefreshOutcome::Disabled;
        }

        let body = match self.source.fetch().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "could not read remote config");
                return RefreshOutcome::FetchFailed(e);
            }
        };

        let interval = match interval::parse(&body) {
            Ok(interval) => interval,
            Err(e) => {
                warn!(error = %e, current = runtime.sampling_interval_secs(), "remote config rejected, keeping interval");
                return RefreshOutcome::Rejected(e);
            }
        };

        if interval.secs() == runtime.sampling_interval_secs() {
            debug!(secs = interval.secs(), "sampling interval unchanged");
            return RefreshOutcome::Unchanged(interval);
        }

        runtime.apply_interval(interval);
        info!(secs = interval.secs(), "sampling interval updated from backend");
        RefreshOutcome::Applied(interval)
    }
}
