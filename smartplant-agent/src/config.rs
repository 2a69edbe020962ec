//! Agent configuration
//!
//! Handles:
//! - Device identity and sampling cadence
//! - Health thresholds
//! - HTTP / MQTT delivery and the remote config endpoint
//! - Driver settings (link, sensor snapshot, indicator outputs)
//!
//! Every section has compiled defaults, so a partial file (or none) works.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::dispatch::{ChannelConfig, PublishChannelConfig, RequestChannelConfig};
use crate::drivers::Credentials;
use crate::error::ConfigError;
use crate::health::{Range, Thresholds};
use crate::interval::{SamplingInterval, DEFAULT_SAMPLING_SECS, MIN_SAMPLING_SECS};
use crate::model::DeviceMetadata;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "SMARTPLANT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub device: DeviceMetadata,
    pub sampling: SamplingConfig,
    pub thresholds: Thresholds,
    pub http: HttpConfig,
    pub remote_config: RemoteConfig,
    pub mqtt: MqttConfig,
    pub link: LinkConfig,
    pub sensor: SensorConfig,
    pub indicator: IndicatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_secs: u16,
    /// Sleep between scheduling passes.
    pub idle_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub observations_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub url: String,
    pub refresh_secs: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub enabled: bool,
    pub broker_host: String,
    pub broker_port: u16,
    pub topic: String,
    pub client_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    pub connect_timeout_secs: u64,
    /// Minimum spacing of out-of-cycle broker reconnects.
    pub retry_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Restrict the link check to one interface (e.g. "wlan0").
    pub interface: Option<String>,
    pub retries: u32,
    pub retry_delay_millis: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// JSON snapshot written by the acquisition process.
    pub path: PathBuf,
    pub light_scale: f32,
    pub light_offset: f32,
    pub adc_max: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub green: Option<PathBuf>,
    pub yellow: Option<PathBuf>,
    pub red: Option<PathBuf>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { interval_secs: DEFAULT_SAMPLING_SECS, idle_millis: 200 }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            observations_url: "http://127.0.0.1:5000/api/observations".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://127.0.0.1:5000/api/config".to_string(),
            refresh_secs: 5,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            broker_host: "127.0.0.1".to_string(),
            broker_port: 1883,
            topic: "smartplant/observations".to_string(),
            client_id: None,
            username: None,
            password: None,
            keep_alive_secs: 30,
            connect_timeout_secs: 5,
            retry_secs: 5,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self { interface: None, retries: 40, retry_delay_millis: 500 }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/run/smartplant/sensor.json"),
            light_scale: 0.7,
            light_offset: 0.0,
            adc_max: 4095,
        }
    }
}

impl AgentConfig {
    /// Load from `$SMARTPLANT_CONFIG` or the OS config directory; compiled
    /// defaults when no file exists.
    pub async fn load() -> Result<Self> {
        let path = Self::config_file_path()?;

        if path.exists() {
            info!(path = %path.display(), "loading configuration");
            Self::load_from(&path).await
        } else {
            warn!(path = %path.display(), "no configuration file, using defaults");
            let mut config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ConfigError::from)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = Self::from_toml_str(&content).with_context(|| format!("loading {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: AgentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get config file path: env override first, then OS config dir
    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        path.push("smartplant-agent");
        path.push("config.toml");
        Ok(path)
    }

    /// Reject settings the loop cannot run with. An out-of-range interval
    /// falls back to the compiled default instead.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if SamplingInterval::new(u64::from(self.sampling.interval_secs)).is_err() {
            warn!(
                configured = self.sampling.interval_secs,
                default = DEFAULT_SAMPLING_SECS,
                "sampling interval out of range, using default"
            );
            self.sampling.interval_secs = DEFAULT_SAMPLING_SECS;
        }

        for (name, range) in [
            ("temperature", &self.thresholds.temperature),
            ("humidity", &self.thresholds.humidity),
            ("light", &self.thresholds.light),
        ] {
            check_range(name, range)?;
        }

        if self.remote_config.refresh_secs == 0 || self.remote_config.refresh_secs > MIN_SAMPLING_SECS {
            return Err(ConfigError::Invalid {
                section: "remote_config",
                reason: format!("refresh_secs must be in 1..={MIN_SAMPLING_SECS}"),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http", "timeout_secs must be positive"));
        }
        if self.mqtt.connect_timeout_secs == 0 {
            return Err(invalid("mqtt", "connect_timeout_secs must be positive"));
        }
        if self.mqtt.keep_alive_secs < 5 {
            return Err(invalid("mqtt", "keep_alive_secs must be at least 5"));
        }
        if self.mqtt.username.is_none() && self.mqtt.password.is_some() {
            return Err(invalid("mqtt", "password given without username"));
        }
        if self.sensor.adc_max == 0 {
            return Err(invalid("sensor", "adc_max must be positive"));
        }
        Ok(())
    }

    pub fn sampling_interval(&self) -> SamplingInterval {
        SamplingInterval::new(u64::from(self.sampling.interval_secs)).unwrap_or_default()
    }

    pub fn refresh_period_millis(&self) -> u32 {
        u32::from(self.remote_config.refresh_secs) * 1000
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.mqtt.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: self.mqtt.password.clone().unwrap_or_default(),
        })
    }

    /// Delivery settings; `client_id` is the resolved MQTT client id.
    pub fn channel_config(&self, client_id: String) -> ChannelConfig {
        ChannelConfig {
            request: RequestChannelConfig {
                enabled: self.http.enabled,
                url: self.http.observations_url.clone(),
            },
            publish: PublishChannelConfig {
                enabled: self.mqtt.enabled,
                topic: self.mqtt.topic.clone(),
                client_id,
                credentials: self.credentials(),
            },
        }
    }
}

fn check_range(name: &str, range: &Range) -> Result<(), ConfigError> {
    if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
        return Err(ConfigError::Invalid {
            section: "thresholds",
            reason: format!("{name} range [{}, {}] is not a valid interval", range.min, range.max),
        });
    }
    Ok(())
}

fn invalid(section: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { section, reason: reason.to_string() }
}
