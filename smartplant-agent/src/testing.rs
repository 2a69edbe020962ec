//! In-crate fakes for unit tests. Integration tests use smartplant-devkit.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dispatch::{ChannelConfig, PublishChannelConfig, RequestChannelConfig};
use crate::drivers::{ConfigSource, Credentials, Link, PublishChannel, RequestChannel, Sensor, StatusIndicator};
use crate::error::{BrokerError, LinkError, SensorError, TransportError};
use crate::model::{HealthStatus, RawReading};
use crate::runtime::Clock;

pub fn channel_config(request: bool, publish: bool) -> ChannelConfig {
    ChannelConfig {
        request: RequestChannelConfig { enabled: request, url: "http://backend/api/observations".into() },
        publish: PublishChannelConfig {
            enabled: publish,
            topic: "smartplant/observations".into(),
            client_id: "SmartPlant-test".into(),
            credentials: None::<Credentials>,
        },
    }
}

#[derive(Clone)]
pub struct FakeSensor {
    reading: Arc<Mutex<Result<RawReading, SensorError>>>,
    reads: Arc<AtomicU32>,
}

impl FakeSensor {
    pub fn reading(temperature: f32, humidity: f32, light_level: f32) -> Self {
        Self {
            reading: Arc::new(Mutex::new(Ok(RawReading { temperature, humidity, light_level }))),
            reads: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sensor for FakeSensor {
    async fn read(&mut self) -> Result<RawReading, SensorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.reading.lock().unwrap().clone()
    }
}

#[derive(Clone)]
pub struct FakeLink {
    connected: Arc<Mutex<bool>>,
    connect_succeeds: bool,
    attempts: Arc<AtomicU32>,
}

impl FakeLink {
    pub fn up() -> Self {
        Self { connected: Arc::new(Mutex::new(true)), connect_succeeds: true, attempts: Arc::new(AtomicU32::new(0)) }
    }

    pub fn down(connect_succeeds: bool) -> Self {
        Self { connected: Arc::new(Mutex::new(false)), connect_succeeds, attempts: Arc::new(AtomicU32::new(0)) }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Link for FakeLink {
    fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.connect_succeeds {
            *self.connected.lock().unwrap() = true;
            Ok(())
        } else {
            Err(LinkError::Unavailable { attempts: 1 })
        }
    }
}

#[derive(Clone)]
pub struct FakeRequest {
    response: Result<u16, TransportError>,
    posts: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl FakeRequest {
    pub fn responding(response: Result<u16, TransportError>) -> Self {
        Self { response, posts: Arc::default() }
    }

    pub fn posts(&self) -> Vec<(String, String, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestChannel for FakeRequest {
    async fn post(&self, url: &str, content_type: &str, body: &str) -> Result<u16, TransportError> {
        self.posts.lock().unwrap().push((url.to_string(), content_type.to_string(), body.to_string()));
        self.response.clone()
    }
}

#[derive(Clone)]
pub struct FakePublish {
    connected: Arc<Mutex<bool>>,
    accepts_connect: bool,
    accepts_publish: Arc<Mutex<bool>>,
    connects: Arc<AtomicU32>,
    published: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakePublish {
    fn with(connected: bool, accepts_connect: bool) -> Self {
        Self {
            connected: Arc::new(Mutex::new(connected)),
            accepts_connect,
            accepts_publish: Arc::new(Mutex::new(true)),
            connects: Arc::new(AtomicU32::new(0)),
            published: Arc::default(),
        }
    }

    pub fn connected() -> Self {
        Self::with(true, true)
    }

    pub fn disconnected() -> Self {
        Self::with(false, true)
    }

    pub fn refusing() -> Self {
        Self::with(false, false)
    }

    pub fn reject_publishes(&self) {
        *self.accepts_publish.lock().unwrap() = false;
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishChannel for FakePublish {
    fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    async fn connect(&mut self, _client_id: &str, _credentials: Option<&Credentials>) -> Result<(), BrokerError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.accepts_connect {
            *self.connected.lock().unwrap() = true;
            Ok(())
        } else {
            Err(BrokerError::Refused("not authorized".into()))
        }
    }

    async fn publish(&mut self, topic: &str, body: &str) -> bool {
        if !*self.accepts_publish.lock().unwrap() {
            return false;
        }
        self.published.lock().unwrap().push((topic.to_string(), body.to_string()));
        true
    }
}

#[derive(Clone, Default)]
pub struct FakeConfigSource {
    responses: Arc<Mutex<VecDeque<Result<String, TransportError>>>>,
    fetches: Arc<AtomicU32>,
}

impl FakeConfigSource {
    pub fn push(&self, response: Result<&str, TransportError>) {
        self.responses.lock().unwrap().push_back(response.map(str::to_string));
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for FakeConfigSource {
    async fn fetch(&self) -> Result<String, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no response queued".into())))
    }
}

#[derive(Clone, Default)]
pub struct FakeIndicator {
    history: Arc<Mutex<Vec<HealthStatus>>>,
}

impl FakeIndicator {
    pub fn history(&self) -> Vec<HealthStatus> {
        self.history.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<HealthStatus> {
        self.history.lock().unwrap().last().copied()
    }
}

impl StatusIndicator for FakeIndicator {
    fn set_indicator(&mut self, status: HealthStatus) {
        self.history.lock().unwrap().push(status);
    }
}

#[derive(Clone, Default)]
pub struct FakeClock(Arc<AtomicU32>);

impl FakeClock {
    pub fn set(&self, millis: u32) {
        self.0.store(millis, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}
