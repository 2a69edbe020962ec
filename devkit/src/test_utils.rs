/*!
Test Harness pour l'agent SmartPlant

Facilite l'écriture de tests d'intégration avec:
- Setup automatique de tous les collaborateurs mockés
- Horloge manuelle pour piloter les cycles
- Assertions sur les livraisons HTTP / MQTT et l'indicateur
*/

use crate::contract_helpers::{Observation, ObservationContract};
use crate::mqtt_stub::MockPublishChannel;
use crate::stubs::{ManualClock, MockConfigSource, MockLink, MockRequestChannel, MockSensor, RecordingIndicator};
use anyhow::{bail, Result};
use smartplant_agent::{Agent, AgentConfig, Collaborators, PassReport};

pub const TEST_CLIENT_ID: &str = "SmartPlant-TEST";

/// Harness de test complet : config + mocks partagés avec l'agent
pub struct TestHarness {
    pub config: AgentConfig,
    pub sensor: MockSensor,
    pub link: MockLink,
    pub request: MockRequestChannel,
    pub mqtt: MockPublishChannel,
    pub config_source: MockConfigSource,
    pub indicator: RecordingIndicator,
    pub clock: ManualClock,
}

impl TestHarness {
    /// Crée un harness : capteur dans les plages, réseau et broker disponibles
    pub fn new() -> Self {
        tracing_subscriber::fmt().with_test_writer().try_init().ok(); // Init logging pour tests

        Self {
            config: AgentConfig::default(),
            sensor: MockSensor::steady(22.0, 55.0, 50.0),
            link: MockLink::up(),
            request: MockRequestChannel::new(),
            mqtt: MockPublishChannel::new(),
            config_source: MockConfigSource::default(),
            indicator: RecordingIndicator::default(),
            clock: ManualClock::default(),
        }
    }

    /// Modifie la config avant construction de l'agent
    pub fn with_config(mut self, edit: impl FnOnce(&mut AgentConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Construit l'agent ; les mocks restent accessibles via le harness
    pub fn build_agent(&self) -> Agent {
        let parts = Collaborators {
            sensor: Box::new(self.sensor.clone()),
            link: Box::new(self.link.clone()),
            request: Box::new(self.request.clone()),
            publish: Box::new(self.mqtt.clone()),
            config_source: Box::new(self.config_source.clone()),
            indicator: Box::new(self.indicator.clone()),
            clock: Box::new(self.clock.clone()),
        };
        Agent::new(&self.config, TEST_CLIENT_ID.to_string(), parts)
    }

    /// Avance l'horloge puis exécute une passe de l'ordonnanceur
    pub async fn tick_after_secs(&self, agent: &mut Agent, secs: u32) -> PassReport {
        self.clock.advance_secs(secs);
        agent.tick().await
    }

    /// Nombre total de livraisons réussies ou tentées, tous canaux
    pub fn delivery_attempts(&self) -> usize {
        self.request.posts().len() + self.mqtt.get_published_messages().len()
    }

    /// Assert que la dernière observation HTTP respecte le contrat
    pub fn last_http_observation(&self) -> Result<Observation> {
        match self.request.posts().last() {
            Some(post) => ObservationContract::check(&post.body),
            None => bail!("no HTTP observation sent"),
        }
    }

    /// Assert que la dernière observation MQTT respecte le contrat
    pub fn last_mqtt_observation(&self) -> Result<Observation> {
        match self.mqtt.find_messages_by_topic(&self.config.mqtt.topic).last() {
            Some(msg) => ObservationContract::check(&msg.payload),
            None => bail!("no MQTT observation on {}", self.config.mqtt.topic),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
