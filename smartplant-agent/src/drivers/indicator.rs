//! Status indicator outputs
//!
//! Three discrete lines: green for ok, yellow for warning and for idle,
//! red for error.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::StatusIndicator;
use crate::config::IndicatorConfig;
use crate::model::HealthStatus;

/// Which of the three lines are driven high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedPattern {
    pub green: bool,
    pub yellow: bool,
    pub red: bool,
}

impl From<HealthStatus> for LedPattern {
    fn from(status: HealthStatus) -> Self {
        LedPattern {
            green: status == HealthStatus::Ok,
            yellow: matches!(status, HealthStatus::Warning | HealthStatus::Idle),
            red: status == HealthStatus::Error,
        }
    }
}

/// Writes `1` / `0` to three value files (sysfs-style GPIO).
pub struct GpioIndicator {
    green: PathBuf,
    yellow: PathBuf,
    red: PathBuf,
}

impl GpioIndicator {
    pub fn new(green: PathBuf, yellow: PathBuf, red: PathBuf) -> Self {
        Self { green, yellow, red }
    }

    fn write_line(path: &Path, high: bool) {
        if let Err(e) = std::fs::write(path, if high { "1" } else { "0" }) {
            warn!(path = %path.display(), error = %e, "could not drive indicator line");
        }
    }
}

impl StatusIndicator for GpioIndicator {
    fn set_indicator(&mut self, status: HealthStatus) {
        let pattern = LedPattern::from(status);
        Self::write_line(&self.green, pattern.green);
        Self::write_line(&self.yellow, pattern.yellow);
        Self::write_line(&self.red, pattern.red);
    }
}

/// Logs status transitions when no output lines are configured.
#[derive(Default)]
pub struct LogIndicator {
    current: Option<HealthStatus>,
}

impl StatusIndicator for LogIndicator {
    fn set_indicator(&mut self, status: HealthStatus) {
        if self.current != Some(status) {
            let pattern = LedPattern::from(status);
            info!(%status, green = pattern.green, yellow = pattern.yellow, red = pattern.red, "indicator");
            self.current = Some(status);
        }
    }
}

/// GPIO lines when all three paths are configured, log output otherwise.
pub fn from_config(config: &IndicatorConfig) -> Box<dyn StatusIndicator> {
    match (&config.green, &config.yellow, &config.red) {
        (Some(green), Some(yellow), Some(red)) => {
            Box::new(GpioIndicator::new(green.clone(), yellow.clone(), red.clone()))
        }
        (None, None, None) => Box::new(LogIndicator::default()),
        _ => {
            warn!("indicator needs green, yellow and red paths; falling back to log output");
            Box::new(LogIndicator::default())
        }
    }
}
