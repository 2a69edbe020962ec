//! Error taxonomy for the agent
//!
//! None of these are fatal: the scheduling loop converts each one into a
//! health status, a skipped delivery or a retained prior value.

use thiserror::Error;

/// The sensor could not produce a usable reading.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SensorError {
    #[error("sensor reading unavailable: {0}")]
    Unavailable(String),
}

/// No network path could be established.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LinkError {
    #[error("network link not established after {attempts} attempts")]
    Unavailable { attempts: u32 },
    #[error("interface enumeration failed: {0}")]
    Interfaces(String),
}

/// A request-based exchange failed before a usable response arrived.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// The broker session could not be established.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BrokerError {
    #[error("broker connection failed: {0}")]
    Connection(String),
    #[error("broker refused connection: {0}")]
    Refused(String),
    #[error("broker did not acknowledge connection in time")]
    Timeout,
}

/// A remote configuration body was rejected; the prior interval stays.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigParseError {
    #[error("config body is not valid JSON: {0}")]
    Malformed(String),
    #[error("config body has no `{0}` field")]
    MissingField(&'static str),
    #[error("`{field}` is not a non-negative integer: {value}")]
    NotAnInteger { field: &'static str, value: String },
    #[error("sampling interval {0}s outside [{min}, {max}]", min = crate::interval::MIN_SAMPLING_SECS, max = crate::interval::MAX_SAMPLING_SECS)]
    OutOfRange(u64),
}

/// Local configuration file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {section} setting: {reason}")]
    Invalid { section: &'static str, reason: String },
    #[error("could not parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}
