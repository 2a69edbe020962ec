//! MQTT publish channel (rumqttc)
//!
//! `connect` drives a fresh event loop inline until the broker answers the
//! CONNECT, then hands it to a background task that keeps the session alive
//! and clears the connected flag on the first connection error. Reconnects
//! always go through `connect` again.

use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, Incoming, MqttOptions, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::{Credentials, PublishChannel};
use crate::config::MqttConfig;
use crate::error::BrokerError;

pub struct MqttPublisher {
    host: String,
    port: u16,
    keep_alive: Duration,
    connect_timeout: Duration,
    client: Option<AsyncClient>,
    connected: Arc<AtomicBool>,
    driver: Option<JoinHandle<()>>,
}

impl MqttPublisher {
    pub fn from_config(config: &MqttConfig) -> Self {
        Self {
            host: config.broker_host.clone(),
            port: config.broker_port,
            keep_alive: Duration::from_secs(config.keep_alive_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            client: None,
            connected: Arc::new(AtomicBool::new(false)),
            driver: None,
        }
    }

    fn shutdown_driver(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        self.client = None;
        self.connected.store(false, Ordering::SeqCst);
    }

    fn spawn_driver(&mut self, mut eventloop: EventLoop) {
        let connected = self.connected.clone();
        self.driver = Some(tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(packet)) => debug!(?packet, "MQTT incoming"),
                    Ok(_) => {}
                    Err(e) => {
                        error!("MQTT connection error: {}", e);
                        connected.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }
        }));
    }
}

/// Poll until the broker acknowledges the connection.
async fn handshake(eventloop: &mut EventLoop) -> Result<(), BrokerError> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                return match ack.code {
                    ConnectReturnCode::Success => Ok(()),
                    code => Err(BrokerError::Refused(format!("{code:?}"))),
                };
            }
            Ok(_) => {}
            Err(e) => return Err(BrokerError::Connection(e.to_string())),
        }
    }
}

#[async_trait]
impl PublishChannel for MqttPublisher {
    fn is_connected(&self) -> bool {
        self.client.is_some() && self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&mut self, client_id: &str, credentials: Option<&Credentials>) -> Result<(), BrokerError> {
        self.shutdown_driver();

        let mut options = MqttOptions::new(client_id, &self.host, self.port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);
        if let Some(creds) = credentials {
            options.set_credentials(&creds.username, &creds.password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 10);
        tokio::time::timeout(self.connect_timeout, handshake(&mut eventloop))
            .await
            .map_err(|_| BrokerError::Timeout)??;

        info!(host = %self.host, port = self.port, "MQTT connected");
        self.connected.store(true, Ordering::SeqCst);
        self.client = Some(client);
        self.spawn_driver(eventloop);
        Ok(())
    }

    async fn publish(&mut self, topic: &str, body: &str) -> bool {
        if !self.is_connected() {
            return false;
        }
        let Some(client) = &self.client else {
            return false;
        };
        match client.publish(topic, QoS::AtLeastOnce, false, body.as_bytes().to_vec()).await {
            Ok(()) => true,
            Err(e) => {
                error!("MQTT publish rejected: {}", e);
                false
            }
        }
    }
}

impl Drop for MqttPublisher {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// `SmartPlant-<mac>` from the primary interface, random suffix otherwise.
pub fn default_client_id() -> String {
    match mac_address::get_mac_address() {
        Ok(Some(mac)) => {
            let hex: String = mac.bytes().iter().map(|b| format!("{b:02X}")).collect();
            format!("SmartPlant-{hex}")
        }
        _ => {
            let id = uuid::Uuid::new_v4().simple().to_string();
            format!("SmartPlant-{}", &id[..8])
        }
    }
}
