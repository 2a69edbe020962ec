/*!
# SmartPlant DevKit - Stubs et Utilitaires pour Développement

Bibliothèque facilitant le test de l'agent SmartPlant avec:
- Stub MQTT pour tests sans broker
- Stubs capteur / réseau / HTTP / configuration / indicateur
- Horloge manuelle pour piloter les cycles
- Validation du contrat d'observation
*/

pub mod contract_helpers;
pub mod mqtt_stub;
pub mod stubs;
pub mod test_utils;

pub use contract_helpers::{Observation, ObservationContract};
pub use mqtt_stub::MockPublishChannel;
pub use stubs::{ManualClock, MockConfigSource, MockLink, MockRequestChannel, MockSensor, RecordingIndicator};
pub use test_utils::TestHarness;
