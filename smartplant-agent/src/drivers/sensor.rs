//! File-backed sensor driver
//!
//! The acquisition process (DHT + LDR) writes a JSON snapshot such as
//! `{"temperature": 22.4, "humidity": 51.0, "lightRaw": 2890}`. Missing or
//! null values come back as NaN so the core rejects the reading.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use super::Sensor;
use crate::config::SensorConfig;
use crate::error::SensorError;
use crate::model::RawReading;

/// Linear mapping of the raw ADC value to a 0–100 percentage.
/// More light means a higher raw value; no inversion is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightScale {
    pub scale: f32,
    pub offset: f32,
    pub adc_max: u16,
}

impl LightScale {
    pub fn percent(&self, raw: u16) -> f32 {
        let level = f32::from(raw) / f32::from(self.adc_max);
        (level * 100.0 * self.scale + self.offset).clamp(0.0, 100.0)
    }
}

impl Default for LightScale {
    fn default() -> Self {
        Self { scale: 0.7, offset: 0.0, adc_max: 4095 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    temperature: Option<f32>,
    humidity: Option<f32>,
    light_raw: Option<u16>,
}

pub struct FileSensor {
    path: PathBuf,
    light: LightScale,
}

impl FileSensor {
    pub fn new(path: impl Into<PathBuf>, light: LightScale) -> Self {
        Self { path: path.into(), light }
    }

    pub fn from_config(config: &SensorConfig) -> Self {
        Self::new(
            config.path.clone(),
            LightScale { scale: config.light_scale, offset: config.light_offset, adc_max: config.adc_max },
        )
    }
}

#[async_trait]
impl Sensor for FileSensor {
    async fn read(&mut self) -> Result<RawReading, SensorError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SensorError::Unavailable(format!("{}: {e}", self.path.display())))?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| SensorError::Unavailable(format!("malformed snapshot: {e}")))?;
        debug!(?snapshot, "sensor snapshot read");

        Ok(RawReading {
            temperature: snapshot.temperature.unwrap_or(f32::NAN),
            humidity: snapshot.humidity.unwrap_or(f32::NAN),
            light_level: snapshot.light_raw.map(|raw| self.light.percent(raw)).unwrap_or(f32::NAN),
        })
    }
}
