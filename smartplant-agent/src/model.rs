//! Cycle-scoped value types shared by the sampling loop

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SensorError;

/// Raw values as handed over by the sensor driver. Components may be NaN
/// when the underlying hardware failed to produce them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub temperature: f32,
    pub humidity: f32,
    pub light_level: f32,
}

/// A validated reading: every component is finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub temperature: f32,
    pub humidity: f32,
    /// Normalised 0–100 percentage, not physical lux.
    pub light_level: f32,
}

impl TryFrom<RawReading> for Sample {
    type Error = SensorError;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        let components = [
            ("temperature", raw.temperature),
            ("humidity", raw.humidity),
            ("light level", raw.light_level),
        ];
        if let Some((name, _)) = components.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SensorError::Unavailable(format!("{name} is not a number")));
        }

        Ok(Sample {
            temperature: raw.temperature,
            humidity: raw.humidity,
            light_level: raw.light_level,
        })
    }
}

/// Static identity of the node, attached to every payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMetadata {
    pub name: String,
    pub location: String,
}

impl Default for DeviceMetadata {
    fn default() -> Self {
        Self {
            name: "SmartPlant".to_string(),
            location: "Living Room".to_string(),
        }
    }
}

/// Coarse device health, recomputed from scratch every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Idle,
    Ok,
    Warning,
    Error,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HealthStatus::Idle => "idle",
            HealthStatus::Ok => "ok",
            HealthStatus::Warning => "warning",
            HealthStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Result of one delivery attempt on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Succeeded,
    Failed,
    /// The channel is disabled in configuration.
    Skipped,
}

impl DeliveryOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, DeliveryOutcome::Succeeded)
    }
}
