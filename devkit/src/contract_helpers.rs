/*!
Helpers pour valider le contrat d'observation

Le backend attend un objet JSON aux champs ordonnés :
`plantName`, `location`, `temperature`, `humidity`, `illuminance`,
avec deux décimales pour température / humidité et un entier pour la lumière.
Ces helpers vérifient le texte brut (ordre, précision) et pas seulement
la valeur JSON parsée.
*/

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Ordre des champs exigé par le contrat
pub const OBSERVATION_FIELDS: [&str; 5] = ["plantName", "location", "temperature", "humidity", "illuminance"];

/// Observation décodée (côté backend)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub plant_name: String,
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub illuminance: i64,
}

pub struct ObservationContract;

impl ObservationContract {
    /// Valide un payload brut et le décode
    pub fn check(raw: &str) -> Result<Observation> {
        let value: Value = serde_json::from_str(raw).context("payload is not JSON")?;
        let object = value.as_object().context("payload is not a JSON object")?;

        if object.len() != OBSERVATION_FIELDS.len() {
            bail!("expected {} fields, got {}", OBSERVATION_FIELDS.len(), object.len());
        }

        let mut cursor = 0;
        for field in OBSERVATION_FIELDS {
            let key = format!("\"{field}\":");
            match raw[cursor..].find(&key) {
                Some(pos) => cursor += pos + key.len(),
                None => bail!("field `{field}` missing or out of order"),
            }
        }

        for field in ["temperature", "humidity"] {
            let literal = Self::number_literal(raw, field)?;
            match literal.split_once('.') {
                Some((_, decimals)) if decimals.len() == 2 => {}
                _ => bail!("`{field}` must carry exactly two decimals, got {literal}"),
            }
        }

        let light = Self::number_literal(raw, "illuminance")?;
        if light.contains('.') {
            bail!("`illuminance` must be an integer, got {light}");
        }

        serde_json::from_value(value).context("payload does not decode as an observation")
    }

    fn number_literal<'a>(raw: &'a str, field: &str) -> Result<&'a str> {
        let key = format!("\"{field}\":");
        let start = raw.find(&key).with_context(|| format!("field `{field}` missing"))? + key.len();
        let rest = &raw[start..];
        let end = rest.find([',', '}']).unwrap_or(rest.len());
        Ok(rest[..end].trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_observation() {
        let raw = r#"{"plantName":"SmartPlant","location":"Living Room","temperature":22.00,"humidity":55.00,"illuminance":50}"#;
        let obs = ObservationContract::check(raw).unwrap();
        assert_eq!(obs.plant_name, "SmartPlant");
        assert_eq!(obs.illuminance, 50);
    }

    #[test]
    fn test_wrong_precision_rejected() {
        let raw = r#"{"plantName":"SmartPlant","location":"Living Room","temperature":22.0,"humidity":55.00,"illuminance":50}"#;
        assert!(ObservationContract::check(raw).is_err());
    }

    #[test]
    fn test_wrong_order_rejected() {
        let raw = r#"{"location":"Living Room","plantName":"SmartPlant","temperature":22.00,"humidity":55.00,"illuminance":50}"#;
        assert!(ObservationContract::check(raw).is_err());
    }

    #[test]
    fn test_float_light_rejected() {
        let raw = r#"{"plantName":"SmartPlant","location":"Living Room","temperature":22.00,"humidity":55.00,"illuminance":50.0}"#;
        assert!(ObservationContract::check(raw).is_err());
    }
}
