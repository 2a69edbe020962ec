//! Live timing state owned by the scheduling loop
//!
//! Timestamps come from a free-running millisecond counter that wraps
//! around (every ~49.7 days). All elapsed-time checks use wrapping
//! subtraction so the wrap never stalls or floods the loop.

use std::time::Instant;

use tracing::warn;

use crate::interval::{SamplingInterval, DEFAULT_SAMPLING_SECS};

/// Source of the wrapping millisecond counter.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u32;
}

/// Milliseconds since the clock was created, truncated to 32 bits.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Milliseconds from `since` to `now`, correct across counter wrap.
pub fn elapsed_millis(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Mutable runtime state: the sampling interval and the two timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    sampling_interval_secs: u16,
    last_config_fetch: u32,
    last_sample: u32,
}

impl RuntimeConfig {
    /// Both timers start at `now`.
    pub fn new(interval: SamplingInterval, now: u32) -> Self {
        Self {
            sampling_interval_secs: interval.secs(),
            last_config_fetch: now,
            last_sample: now,
        }
    }

    pub fn sampling_interval_secs(&self) -> u16 {
        self.sampling_interval_secs
    }

    pub fn sampling_interval_millis(&self) -> u32 {
        u32::from(self.sampling_interval_secs) * 1000
    }

    pub fn last_sample(&self) -> u32 {
        self.last_sample
    }

    pub fn last_config_fetch(&self) -> u32 {
        self.last_config_fetch
    }

    /// Replace the interval. Only a validated value can get here.
    pub fn apply_interval(&mut self, interval: SamplingInterval) {
        self.sampling_interval_secs = interval.secs();
    }

    pub fn mark_sampled(&mut self, now: u32) {
        self.last_sample = now;
    }

    pub fn mark_config_fetched(&mut self, now: u32) {
        self.last_config_fetch = now;
    }

    pub fn sample_due(&self, now: u32) -> bool {
        elapsed_millis(now, self.last_sample) >= self.sampling_interval_millis()
    }

    pub fn config_fetch_due(&self, now: u32, period_millis: u32) -> bool {
        elapsed_millis(now, self.last_config_fetch) >= period_millis
    }

    /// Restore the compiled default if the interval was corrupted to zero.
    /// Returns true when a reset happened.
    pub fn sanitize(&mut self) -> bool {
        if self.sampling_interval_secs == 0 {
            warn!(default = DEFAULT_SAMPLING_SECS, "sampling interval was 0, restoring default");
            self.sampling_interval_secs = DEFAULT_SAMPLING_SECS;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn corrupt_interval(&mut self) {
        self.sampling_interval_secs = 0;
    }
}
