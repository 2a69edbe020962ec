/*!
Stubs des autres collaborateurs de l'agent

Capteur, lien réseau, canal HTTP, source de configuration, indicateur et
horloge manuelle. Chaque stub est `Clone` : le clone garde le même état
partagé, on peut donc en donner un à l'agent et garder l'autre pour les
assertions.
*/

use async_trait::async_trait;
use smartplant_agent::drivers::{ConfigSource, Link, RequestChannel, Sensor, StatusIndicator};
use smartplant_agent::error::{LinkError, SensorError, TransportError};
use smartplant_agent::{Clock, HealthStatus, RawReading};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Capteur scripté : rejoue une file de lectures puis revient à la lecture stable
#[derive(Clone)]
pub struct MockSensor {
    queue: Arc<Mutex<VecDeque<Result<RawReading, SensorError>>>>,
    baseline: RawReading,
    reads: Arc<AtomicU32>,
}

impl MockSensor {
    pub fn steady(temperature: f32, humidity: f32, light_level: f32) -> Self {
        Self {
            queue: Arc::default(),
            baseline: RawReading { temperature, humidity, light_level },
            reads: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Ajoute une lecture à rejouer
    pub fn push(&self, temperature: f32, humidity: f32, light_level: f32) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Ok(RawReading { temperature, humidity, light_level }));
    }

    /// Ajoute une panne capteur à rejouer
    pub fn push_failure(&self, reason: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Err(SensorError::Unavailable(reason.to_string())));
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sensor for MockSensor {
    async fn read(&mut self) -> Result<RawReading, SensorError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().unwrap().pop_front();
        next.unwrap_or(Ok(self.baseline))
    }
}

/// Lien réseau piloté par le test
#[derive(Clone)]
pub struct MockLink {
    connected: Arc<Mutex<bool>>,
    connect_ok: Arc<Mutex<bool>>,
    attempts: Arc<AtomicU32>,
}

impl MockLink {
    pub fn up() -> Self {
        Self {
            connected: Arc::new(Mutex::new(true)),
            connect_ok: Arc::new(Mutex::new(true)),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Lien coupé ; `recoverable` indique si `connect` réussira
    pub fn down(recoverable: bool) -> Self {
        let link = Self::up();
        *link.connected.lock().unwrap() = false;
        *link.connect_ok.lock().unwrap() = recoverable;
        link
    }

    pub fn set_connected(&self, connected: bool) {
        *self.connected.lock().unwrap() = connected;
    }

    pub fn set_recoverable(&self, recoverable: bool) {
        *self.connect_ok.lock().unwrap() = recoverable;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Link for MockLink {
    fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.connect_ok.lock().unwrap() {
            *self.connected.lock().unwrap() = true;
            Ok(())
        } else {
            Err(LinkError::Unavailable { attempts: attempt })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPost {
    pub url: String,
    pub content_type: String,
    pub body: String,
}

/// Canal HTTP : répond avec un code fixe (200 par défaut) ou une erreur
#[derive(Clone)]
pub struct MockRequestChannel {
    response: Arc<Mutex<Result<u16, TransportError>>>,
    posts: Arc<Mutex<Vec<RecordedPost>>>,
}

impl MockRequestChannel {
    pub fn new() -> Self {
        Self::responding(200)
    }

    pub fn responding(code: u16) -> Self {
        Self { response: Arc::new(Mutex::new(Ok(code))), posts: Arc::default() }
    }

    pub fn set_status(&self, code: u16) {
        *self.response.lock().unwrap() = Ok(code);
    }

    /// Simule une absence de réponse (timeout, connexion refusée)
    pub fn set_unreachable(&self) {
        *self.response.lock().unwrap() = Err(TransportError::Request("connection refused".into()));
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }
}

impl Default for MockRequestChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestChannel for MockRequestChannel {
    async fn post(&self, url: &str, content_type: &str, body: &str) -> Result<u16, TransportError> {
        self.posts.lock().unwrap().push(RecordedPost {
            url: url.to_string(),
            content_type: content_type.to_string(),
            body: body.to_string(),
        });
        self.response.lock().unwrap().clone()
    }
}

/// Backend de configuration : file de réponses, erreur quand elle est vide
#[derive(Clone, Default)]
pub struct MockConfigSource {
    responses: Arc<Mutex<VecDeque<Result<String, TransportError>>>>,
    fetches: Arc<AtomicU32>,
}

impl MockConfigSource {
    pub fn push_body(&self, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(body.to_string()));
    }

    pub fn push_interval(&self, secs: i64) {
        self.push_body(&serde_json::json!({ "samplingSeconds": secs }).to_string());
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn fetches(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigSource for MockConfigSource {
    async fn fetch(&self) -> Result<String, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("backend unreachable".into())))
    }
}

/// Indicateur qui garde l'historique des statuts affichés
#[derive(Clone, Default)]
pub struct RecordingIndicator {
    history: Arc<Mutex<Vec<HealthStatus>>>,
}

impl RecordingIndicator {
    pub fn history(&self) -> Vec<HealthStatus> {
        self.history.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<HealthStatus> {
        self.history.lock().unwrap().last().copied()
    }

    pub fn clear(&self) {
        self.history.lock().unwrap().clear();
    }
}

impl StatusIndicator for RecordingIndicator {
    fn set_indicator(&mut self, status: HealthStatus) {
        self.history.lock().unwrap().push(status);
    }
}

/// Horloge manuelle (compteur 32 bits en millisecondes, comme sur le nœud)
#[derive(Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn starting_at(millis: u32) -> Self {
        Self { millis: Arc::new(AtomicU32::new(millis)) }
    }

    pub fn set(&self, millis: u32) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Avance l'horloge ; le compteur reboucle comme le vrai
    pub fn advance_millis(&self, delta: u32) {
        let now = self.millis.load(Ordering::SeqCst);
        self.millis.store(now.wrapping_add(delta), Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u32) {
        self.advance_millis(secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u32 {
        self.millis.load(Ordering::SeqCst)
    }
}
