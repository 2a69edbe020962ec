//! Health classification from sensor thresholds and delivery results

use serde::{Deserialize, Serialize};

use crate::model::{HealthStatus, Sample};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Acceptable ranges for each measured quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub temperature: Range,
    pub humidity: Range,
    /// Percentage of the light sensor span, not lux.
    pub light: Range,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temperature: Range::new(18.0, 28.0),
            humidity: Range::new(40.0, 70.0),
            light: Range::new(20.0, 80.0),
        }
    }
}

impl Thresholds {
    pub fn all_within(&self, sample: &Sample) -> bool {
        self.temperature.contains(sample.temperature)
            && self.humidity.contains(sample.humidity)
            && self.light.contains(sample.light_level)
    }
}

/// Classify one cycle.
///
/// Delivery failure dominates: when no channel succeeded the result is
/// `Error` whatever the readings are. Otherwise `Ok` if every value sits in
/// its range, `Warning` if any does not.
pub fn evaluate(sample: &Sample, thresholds: &Thresholds, delivered: bool) -> HealthStatus {
    if !delivered {
        HealthStatus::Error
    } else if thresholds.all_within(sample) {
        HealthStatus::Ok
    } else {
        HealthStatus::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(temperature: f32, humidity: f32, light_level: f32) -> Sample {
        Sample { temperature, humidity, light_level }
    }

    #[test]
    fn test_in_range_and_delivered_is_ok() {
        let status = evaluate(&sample(22.0, 55.0, 50.0), &Thresholds::default(), true);
        assert_eq!(status, HealthStatus::Ok);
    }

    #[test]
    fn test_no_delivery_is_error_even_in_range() {
        let status = evaluate(&sample(22.0, 55.0, 50.0), &Thresholds::default(), false);
        assert_eq!(status, HealthStatus::Error);
    }

    #[test]
    fn test_no_delivery_dominates_out_of_range() {
        let status = evaluate(&sample(40.0, 10.0, 99.0), &Thresholds::default(), false);
        assert_eq!(status, HealthStatus::Error);
    }

    #[test]
    fn test_any_value_out_of_range_is_warning() {
        let t = Thresholds::default();
        assert_eq!(evaluate(&sample(30.0, 55.0, 50.0), &t, true), HealthStatus::Warning);
        assert_eq!(evaluate(&sample(22.0, 39.9, 50.0), &t, true), HealthStatus::Warning);
        assert_eq!(evaluate(&sample(22.0, 55.0, 81.0), &t, true), HealthStatus::Warning);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let t = Thresholds::default();
        assert_eq!(evaluate(&sample(18.0, 40.0, 20.0), &t, true), HealthStatus::Ok);
        assert_eq!(evaluate(&sample(28.0, 70.0, 80.0), &t, true), HealthStatus::Ok);
    }

    #[test]
    fn test_same_inputs_same_status() {
        let t = Thresholds::default();
        let s = sample(25.0, 75.0, 50.0);
        let first = evaluate(&s, &t, true);
        for _ in 0..5 {
            assert_eq!(evaluate(&s, &t, true), first);
        }
    }
}
