//! Sampling interval validation and remote config parsing
//!
//! The remote body is parsed into a JSON value and a single top-level field
//! is looked up. Anything ambiguous is rejected so the caller keeps its
//! current interval.

use serde_json::Value;

use crate::error::ConfigParseError;

pub const MIN_SAMPLING_SECS: u16 = 5;
pub const MAX_SAMPLING_SECS: u16 = 3600;
pub const DEFAULT_SAMPLING_SECS: u16 = 60;

/// Field carrying the desired interval in the config response.
pub const SAMPLING_FIELD: &str = "samplingSeconds";

/// A sampling interval known to lie in `[MIN_SAMPLING_SECS, MAX_SAMPLING_SECS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SamplingInterval(u16);

impl SamplingInterval {
    pub fn new(secs: u64) -> Result<Self, ConfigParseError> {
        if (MIN_SAMPLING_SECS as u64..=MAX_SAMPLING_SECS as u64).contains(&secs) {
            Ok(SamplingInterval(secs as u16))
        } else {
            Err(ConfigParseError::OutOfRange(secs))
        }
    }

    pub fn secs(self) -> u16 {
        self.0
    }

    pub fn as_millis(self) -> u32 {
        u32::from(self.0) * 1000
    }
}

impl Default for SamplingInterval {
    fn default() -> Self {
        SamplingInterval(DEFAULT_SAMPLING_SECS)
    }
}

/// Extract and validate the sampling interval from a config response body.
pub fn parse(body: &str) -> Result<SamplingInterval, ConfigParseError> {
    let document: Value =
        serde_json::from_str(body).map_err(|e| ConfigParseError::Malformed(e.to_string()))?;

    let field = document
        .get(SAMPLING_FIELD)
        .ok_or(ConfigParseError::MissingField(SAMPLING_FIELD))?;

    let secs = field.as_u64().ok_or_else(|| ConfigParseError::NotAnInteger {
        field: SAMPLING_FIELD,
        value: field.to_string(),
    })?;

    SamplingInterval::new(secs)
}
