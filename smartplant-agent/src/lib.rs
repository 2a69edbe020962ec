//! SmartPlant Agent - environmental telemetry for a plant-monitoring node
//!
//! The agent periodically:
//! - Samples temperature, humidity and ambient light
//! - Delivers each reading over HTTP POST and MQTT publish, independently
//! - Derives a coarse health status and drives a tri-colour indicator
//! - Re-reads its sampling interval from the backend without a restart

pub mod agent;
pub mod config;
pub mod cycle;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod health;
pub mod interval;
pub mod model;
pub mod payload;
pub mod reconfig;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{Agent, Collaborators, PassReport};
pub use config::AgentConfig;
pub use cycle::{CycleOutcome, CyclePhase, CycleReport, SampleCycleController};
pub use dispatch::{ChannelConfig, DeliveryDispatcher, DispatchReport};
pub use interval::SamplingInterval;
pub use model::{DeliveryOutcome, DeviceMetadata, HealthStatus, RawReading, Sample};
pub use payload::Payload;
pub use reconfig::{ReconfigurationScheduler, RefreshOutcome};
pub use runtime::{Clock, MonotonicClock, RuntimeConfig};
