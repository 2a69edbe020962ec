//! Observation payload shared by both delivery channels
//!
//! The body is assembled by hand rather than through a serializer so that
//! field order and numeric precision are fixed regardless of the value:
//! temperature and humidity always carry two decimals, light is an integer.

use serde_json::Value;

use crate::model::{DeviceMetadata, Sample};

pub const CONTENT_TYPE: &str = "application/json";

/// Serialized observation, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(String);

impl Payload {
    pub fn build(metadata: &DeviceMetadata, sample: &Sample) -> Self {
        // Value's Display escapes the strings as JSON
        let name = Value::from(metadata.name.as_str());
        let location = Value::from(metadata.location.as_str());
        let light = sample.light_level.round() as i64;

        Payload(format!(
            "{{\"plantName\":{name},\"location\":{location},\"temperature\":{:.2},\"humidity\":{:.2},\"illuminance\":{light}}}",
            sample.temperature, sample.humidity,
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> DeviceMetadata {
        DeviceMetadata { name: "SmartPlant".into(), location: "Living Room".into() }
    }

    #[test]
    fn test_fixed_precision_and_order() {
        let sample = Sample { temperature: 22.0, humidity: 55.0, light_level: 50.0 };
        let payload = Payload::build(&metadata(), &sample);
        assert_eq!(
            payload.as_str(),
            r#"{"plantName":"SmartPlant","location":"Living Room","temperature":22.00,"humidity":55.00,"illuminance":50}"#
        );
    }

    #[test]
    fn test_values_are_rounded() {
        let sample = Sample { temperature: 21.456, humidity: 60.004, light_level: 49.6 };
        let payload = Payload::build(&metadata(), &sample);
        assert!(payload.as_str().contains(r#""temperature":21.46"#));
        assert!(payload.as_str().contains(r#""humidity":60.00"#));
        assert!(payload.as_str().contains(r#""illuminance":50}"#));
    }

    #[test]
    fn test_metadata_is_escaped_and_valid_json() {
        let meta = DeviceMetadata { name: "Fern \"B\"".into(), location: "Hall\\2".into() };
        let sample = Sample { temperature: -3.5, humidity: 0.0, light_level: 0.0 };
        let payload = Payload::build(&meta, &sample);

        let parsed: Value = serde_json::from_str(payload.as_str()).unwrap();
        assert_eq!(parsed["plantName"], "Fern \"B\"");
        assert_eq!(parsed["location"], "Hall\\2");
        assert_eq!(parsed["temperature"], -3.5);
        assert_eq!(parsed["illuminance"], 0);
    }
}
