//! Sample cycle: trigger → sample → dispatch → status
//!
//! A cycle runs to completion once started. The sample timer is stamped
//! with the cycle start time whatever the outcome, so a failed cycle waits
//! a full interval before the next attempt instead of retrying every pass.

use tracing::{debug, error, info, warn};

use crate::dispatch::{DeliveryDispatcher, DispatchReport};
use crate::drivers::{Link, Sensor, StatusIndicator};
use crate::error::{BrokerError, LinkError};
use crate::health::{self, Thresholds};
use crate::model::{DeviceMetadata, HealthStatus, Sample};
use crate::payload::Payload;
use crate::runtime::RuntimeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    AwaitingTrigger,
    Sampling,
    Dispatching,
    StatusUpdate,
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Dispatched(DispatchReport),
    /// The sensor gave no usable reading; nothing was sent.
    SensorUnavailable,
    /// No network path even after one reconnect; nothing was sent.
    LinkUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub started_at: u32,
    pub sample: Option<Sample>,
    pub outcome: CycleOutcome,
    pub status: HealthStatus,
}

pub struct SampleCycleController {
    metadata: DeviceMetadata,
    thresholds: Thresholds,
    sensor: Box<dyn Sensor>,
    link: Box<dyn Link>,
    dispatcher: DeliveryDispatcher,
    indicator: Box<dyn StatusIndicator>,
    phase: CyclePhase,
    status: HealthStatus,
}

impl SampleCycleController {
    pub fn new(
        metadata: DeviceMetadata,
        thresholds: Thresholds,
        sensor: Box<dyn Sensor>,
        link: Box<dyn Link>,
        dispatcher: DeliveryDispatcher,
        indicator: Box<dyn StatusIndicator>,
    ) -> Self {
        Self {
            metadata,
            thresholds,
            sensor,
            link,
            dispatcher,
            indicator,
            phase: CyclePhase::AwaitingTrigger,
            status: HealthStatus::Idle,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Last status pushed to the indicator.
    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn is_due(&self, runtime: &RuntimeConfig, now: u32) -> bool {
        self.phase == CyclePhase::AwaitingTrigger && runtime.sample_due(now)
    }

    /// Run a cycle if the trigger condition holds at `now`.
    pub async fn poll(&mut self, runtime: &mut RuntimeConfig, now: u32) -> Option<CycleReport> {
        if !self.is_due(runtime, now) {
            return None;
        }
        Some(self.run_cycle(runtime, now).await)
    }

    pub async fn run_cycle(&mut self, runtime: &mut RuntimeConfig, now: u32) -> CycleReport {
        runtime.mark_sampled(now);
        self.enter(CyclePhase::Sampling);

        let sample = match self.sensor.read().await.and_then(Sample::try_from) {
            Ok(sample) => sample,
            Err(e) => {
                error!(error = %e, "sensor read failed, skipping dispatch");
                return self.finish(now, None, CycleOutcome::SensorUnavailable, HealthStatus::Error);
            }
        };
        info!(
            temperature = sample.temperature,
            humidity = sample.humidity,
            light = sample.light_level,
            "sample acquired"
        );

        if !self.link.is_connected() {
            warn!("network link down, reconnecting before dispatch");
            if let Err(e) = self.link.connect().await {
                error!(error = %e, "no network link, not sending");
                return self.finish(now, Some(sample), CycleOutcome::LinkUnavailable, HealthStatus::Error);
            }
        }

        self.enter(CyclePhase::Dispatching);
        let payload = Payload::build(&self.metadata, &sample);
        debug!(bytes = payload.len(), "payload built");
        let report = self.dispatcher.dispatch(&payload).await;

        let status = health::evaluate(&sample, &self.thresholds, report.delivered());
        self.finish(now, Some(sample), CycleOutcome::Dispatched(report), status)
    }

    fn finish(&mut self, started_at: u32, sample: Option<Sample>, outcome: CycleOutcome, status: HealthStatus) -> CycleReport {
        self.enter(CyclePhase::StatusUpdate);
        self.show(status);
        self.enter(CyclePhase::AwaitingTrigger);
        CycleReport { started_at, sample, outcome, status }
    }

    fn enter(&mut self, phase: CyclePhase) {
        debug!(from = ?self.phase, to = ?phase, "cycle phase");
        self.phase = phase;
    }

    pub fn show(&mut self, status: HealthStatus) {
        if status != self.status {
            info!(%status, "status changed");
        }
        self.indicator.set_indicator(status);
        self.status = status;
    }

    pub fn link_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Out-of-cycle link upkeep: Idle once connected, Error if not.
    pub async fn reconnect_link(&mut self) -> Result<(), LinkError> {
        info!("connecting network link");
        match self.link.connect().await {
            Ok(()) => {
                info!("network link established");
                self.show(HealthStatus::Idle);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "could not establish network link");
                self.show(HealthStatus::Error);
                Err(e)
            }
        }
    }

    pub fn broker_needs_connect(&self) -> bool {
        self.dispatcher.broker_needs_connect()
    }

    /// Out-of-cycle broker upkeep: a failed connection shows Warning.
    pub async fn reconnect_broker(&mut self) -> Result<(), BrokerError> {
        match self.dispatcher.connect_broker().await {
            Ok(()) => {
                info!("MQTT broker connected");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "MQTT broker connection failed");
                self.show(HealthStatus::Warning);
                Err(e)
            }
        }
    }
}
