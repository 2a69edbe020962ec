/*!
Mock du canal MQTT pour développement sans broker

Permet de tester l'agent sans démarrer un broker MQTT réel.
Enregistre tous les messages publiés et les tentatives de connexion,
et permet de simuler un broker qui refuse ou qui tombe.
*/

use async_trait::async_trait;
use smartplant_agent::drivers::{Credentials, PublishChannel};
use smartplant_agent::error::BrokerError;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct MockMessage {
    pub topic: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectAttempt {
    pub client_id: String,
    pub credentials: Option<Credentials>,
}

#[derive(Debug)]
struct BrokerState {
    connected: bool,
    accept_connect: bool,
    accept_publish: bool,
    published: Vec<MockMessage>,
    connects: Vec<ConnectAttempt>,
}

/// Mock du canal de publication qui simule rumqttc::AsyncClient
#[derive(Clone)]
pub struct MockPublishChannel {
    state: Arc<Mutex<BrokerState>>,
}

impl MockPublishChannel {
    /// Broker joignable, session déjà ouverte
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState {
                connected: true,
                accept_connect: true,
                accept_publish: true,
                published: Vec::new(),
                connects: Vec::new(),
            })),
        }
    }

    /// Broker joignable mais pas encore de session
    pub fn disconnected() -> Self {
        let mock = Self::new();
        mock.state.lock().unwrap().connected = false;
        mock
    }

    /// Broker qui refuse toute connexion
    pub fn refusing() -> Self {
        let mock = Self::disconnected();
        mock.state.lock().unwrap().accept_connect = false;
        mock
    }

    /// Simule une coupure de session (le prochain envoi devra reconnecter)
    pub fn drop_session(&self) {
        self.state.lock().unwrap().connected = false;
    }

    pub fn set_accept_connect(&self, accept: bool) {
        self.state.lock().unwrap().accept_connect = accept;
    }

    pub fn set_accept_publish(&self, accept: bool) {
        self.state.lock().unwrap().accept_publish = accept;
    }

    /// Récupère tous les messages publiés (pour assertions de tests)
    pub fn get_published_messages(&self) -> Vec<MockMessage> {
        self.state.lock().unwrap().published.clone()
    }

    /// Trouve les messages publiés sur un topic donné
    pub fn find_messages_by_topic(&self, topic: &str) -> Vec<MockMessage> {
        self.state
            .lock()
            .unwrap()
            .published
            .iter()
            .filter(|msg| msg.topic == topic)
            .cloned()
            .collect()
    }

    /// Parse le dernier message d'un topic en JSON
    pub fn get_last_json_message<T>(&self, topic: &str) -> anyhow::Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.find_messages_by_topic(topic).last() {
            Some(last_msg) => Ok(Some(serde_json::from_str(&last_msg.payload)?)),
            None => Ok(None),
        }
    }

    pub fn connect_attempts(&self) -> Vec<ConnectAttempt> {
        self.state.lock().unwrap().connects.clone()
    }

    /// Reset tous les messages enregistrés
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.published.clear();
        state.connects.clear();
    }
}

impl Default for MockPublishChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublishChannel for MockPublishChannel {
    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn connect(&mut self, client_id: &str, credentials: Option<&Credentials>) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.connects.push(ConnectAttempt {
            client_id: client_id.to_string(),
            credentials: credentials.cloned(),
        });

        if state.accept_connect {
            state.connected = true;
            tracing::info!("[MOCK] MQTT connected as {}", client_id);
            Ok(())
        } else {
            tracing::info!("[MOCK] MQTT connection refused for {}", client_id);
            Err(BrokerError::Refused("NotAuthorized".into()))
        }
    }

    async fn publish(&mut self, topic: &str, body: &str) -> bool {
        let mut state = self.state.lock().unwrap();
        if !state.connected || !state.accept_publish {
            return false;
        }
        state.published.push(MockMessage { topic: topic.to_string(), payload: body.to_string() });
        tracing::info!("[MOCK] Published to {}: {} bytes", topic, body.len());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_publish_records_messages() {
        let mut channel = MockPublishChannel::new();
        assert!(channel.publish("test/topic", r#"{"n": 42}"#).await);

        let messages = channel.get_published_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].topic, "test/topic");

        let parsed: Option<serde_json::Value> = channel.get_last_json_message("test/topic").unwrap();
        assert_eq!(parsed.unwrap()["n"], 42);
    }

    #[tokio::test]
    async fn test_refusing_broker() {
        let mut channel = MockPublishChannel::refusing();
        assert!(channel.connect("SmartPlant-1", None).await.is_err());
        assert!(!channel.is_connected());
        assert!(!channel.publish("t", "{}").await);
        assert_eq!(channel.connect_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_session_needs_reconnect() {
        let mut channel = MockPublishChannel::new();
        channel.drop_session();
        assert!(!channel.publish("t", "{}").await);
        channel.connect("SmartPlant-1", None).await.unwrap();
        assert!(channel.publish("t", "{}").await);
    }
}
