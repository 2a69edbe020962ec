//! Collaborator interfaces and their host implementations
//!
//! The core only talks to hardware and network through these traits.
//! Every async method is a potential multi-second stall bounded by the
//! implementation's own timeout; callers await each one to completion.

pub mod http;
pub mod indicator;
pub mod link;
pub mod mqtt;
pub mod sensor;

use async_trait::async_trait;

use crate::error::{BrokerError, LinkError, SensorError, TransportError};
use crate::model::{HealthStatus, RawReading};

/// Temperature / humidity / light acquisition.
#[async_trait]
pub trait Sensor: Send + Sync {
    async fn read(&mut self) -> Result<RawReading, SensorError>;
}

/// Network path to the backend.
#[async_trait]
pub trait Link: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Blocking connection attempt with retries internal to the link.
    async fn connect(&mut self) -> Result<(), LinkError>;
}

/// Request/response delivery (HTTP POST).
#[async_trait]
pub trait RequestChannel: Send + Sync {
    /// Returns the response status code, or a transport error when no
    /// response arrived.
    async fn post(&self, url: &str, content_type: &str, body: &str) -> Result<u16, TransportError>;
}

/// Username / password pair for the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Broker-based delivery (MQTT publish).
#[async_trait]
pub trait PublishChannel: Send + Sync {
    fn is_connected(&self) -> bool;

    async fn connect(&mut self, client_id: &str, credentials: Option<&Credentials>) -> Result<(), BrokerError>;

    async fn publish(&mut self, topic: &str, body: &str) -> bool;
}

/// Remote configuration endpoint.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<String, TransportError>;
}

/// Fire-and-forget status output.
pub trait StatusIndicator: Send + Sync {
    fn set_indicator(&mut self, status: HealthStatus);
}
