//! Delivery of one payload over the request and publish channels
//!
//! The two attempts are independent: neither sees the other's outcome and
//! a failure on one never prevents the other.

use tracing::{debug, info, warn};

use crate::drivers::{Credentials, PublishChannel, RequestChannel};
use crate::error::BrokerError;
use crate::model::DeliveryOutcome;
use crate::payload::{Payload, CONTENT_TYPE};

/// Responses below this status count as delivered.
pub const CLIENT_ERROR_THRESHOLD: u16 = 400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestChannelConfig {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishChannelConfig {
    pub enabled: bool,
    pub topic: String,
    pub client_id: String,
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub request: RequestChannelConfig,
    pub publish: PublishChannelConfig,
}

/// Per-channel outcomes of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub request: DeliveryOutcome,
    pub publish: DeliveryOutcome,
}

impl DispatchReport {
    /// Aggregate success: at least one channel delivered.
    pub fn delivered(&self) -> bool {
        self.request.is_success() || self.publish.is_success()
    }
}

pub struct DeliveryDispatcher {
    config: ChannelConfig,
    request: Box<dyn RequestChannel>,
    publish: Box<dyn PublishChannel>,
}

impl DeliveryDispatcher {
    pub fn new(config: ChannelConfig, request: Box<dyn RequestChannel>, publish: Box<dyn PublishChannel>) -> Self {
        Self { config, request, publish }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Attempt both channels and report each outcome.
    pub async fn dispatch(&mut self, payload: &Payload) -> DispatchReport {
        let request = self.send_request(payload).await;
        let publish = self.send_publish(payload).await;
        debug!(?request, ?publish, "dispatch finished");
        DispatchReport { request, publish }
    }

    async fn send_request(&self, payload: &Payload) -> DeliveryOutcome {
        let cfg = &self.config.request;
        if !cfg.enabled {
            return DeliveryOutcome::Skipped;
        }

        match self.request.post(&cfg.url, CONTENT_TYPE, payload.as_str()).await {
            Ok(code) if code < CLIENT_ERROR_THRESHOLD => {
                info!(code, "HTTP delivery accepted");
                DeliveryOutcome::Succeeded
            }
            Ok(code) => {
                warn!(code, "HTTP delivery rejected");
                DeliveryOutcome::Failed
            }
            Err(e) => {
                warn!(error = %e, "HTTP delivery failed");
                DeliveryOutcome::Failed
            }
        }
    }

    async fn send_publish(&mut self, payload: &Payload) -> DeliveryOutcome {
        if !self.config.publish.enabled {
            return DeliveryOutcome::Skipped;
        }

        if !self.publish.is_connected() {
            if let Err(e) = self.connect_broker().await {
                warn!(error = %e, "MQTT unavailable, not publishing");
                return DeliveryOutcome::Failed;
            }
        }

        if self.publish.publish(&self.config.publish.topic, payload.as_str()).await {
            info!(topic = %self.config.publish.topic, "MQTT publish OK");
            DeliveryOutcome::Succeeded
        } else {
            warn!(topic = %self.config.publish.topic, "MQTT publish failed");
            DeliveryOutcome::Failed
        }
    }

    /// True when the publish channel is enabled but has no broker session.
    pub fn broker_needs_connect(&self) -> bool {
        self.config.publish.enabled && !self.publish.is_connected()
    }

    /// Single inline attempt to open the broker session.
    pub async fn connect_broker(&mut self) -> Result<(), BrokerError> {
        let cfg = &self.config.publish;
        info!(client_id = %cfg.client_id, "connecting to MQTT broker");
        self.publish.connect(&cfg.client_id, cfg.credentials.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::model::{DeviceMetadata, Sample};
    use crate::testing::{channel_config, FakePublish, FakeRequest};

    fn payload() -> Payload {
        let sample = Sample { temperature: 22.0, humidity: 55.0, light_level: 50.0 };
        Payload::build(&DeviceMetadata::default(), &sample)
    }

    fn dispatcher(config: ChannelConfig, request: &FakeRequest, publish: &FakePublish) -> DeliveryDispatcher {
        DeliveryDispatcher::new(config, Box::new(request.clone()), Box::new(publish.clone()))
    }

    #[tokio::test]
    async fn test_both_channels_succeed() {
        let request = FakeRequest::responding(Ok(200));
        let publish = FakePublish::connected();
        let mut d = dispatcher(channel_config(true, true), &request, &publish);

        let report = d.dispatch(&payload()).await;
        assert_eq!(report.request, DeliveryOutcome::Succeeded);
        assert_eq!(report.publish, DeliveryOutcome::Succeeded);
        assert!(report.delivered());

        let posts = request.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].1, CONTENT_TYPE);
        assert_eq!(publish.published(), vec![("smartplant/observations".to_string(), payload().as_str().to_string())]);
    }

    #[tokio::test]
    async fn test_server_error_with_publish_disabled_is_not_delivered() {
        let request = FakeRequest::responding(Ok(500));
        let publish = FakePublish::connected();
        let mut d = dispatcher(channel_config(true, false), &request, &publish);

        let report = d.dispatch(&payload()).await;
        assert_eq!(report.request, DeliveryOutcome::Failed);
        assert_eq!(report.publish, DeliveryOutcome::Skipped);
        assert!(!report.delivered());
        assert!(publish.published().is_empty());
    }

    #[tokio::test]
    async fn test_status_threshold() {
        for (code, expected) in [(201, DeliveryOutcome::Succeeded), (399, DeliveryOutcome::Succeeded), (400, DeliveryOutcome::Failed), (404, DeliveryOutcome::Failed)] {
            let request = FakeRequest::responding(Ok(code));
            let mut d = dispatcher(channel_config(true, false), &request, &FakePublish::connected());
            assert_eq!(d.dispatch(&payload()).await.request, expected, "status {code}");
        }
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_block_publish() {
        let request = FakeRequest::responding(Err(TransportError::Request("connection refused".into())));
        let publish = FakePublish::connected();
        let mut d = dispatcher(channel_config(true, true), &request, &publish);

        let report = d.dispatch(&payload()).await;
        assert_eq!(report.request, DeliveryOutcome::Failed);
        assert_eq!(report.publish, DeliveryOutcome::Succeeded);
        assert!(report.delivered());
    }

    #[tokio::test]
    async fn test_disconnected_broker_gets_one_reconnect() {
        let publish = FakePublish::disconnected();
        let mut d = dispatcher(channel_config(false, true), &FakeRequest::responding(Ok(200)), &publish);

        let report = d.dispatch(&payload()).await;
        assert_eq!(report.request, DeliveryOutcome::Skipped);
        assert_eq!(report.publish, DeliveryOutcome::Succeeded);
        assert_eq!(publish.connect_attempts(), 1);
    }

    #[tokio::test]
    async fn test_failed_reconnect_fails_publish() {
        let publish = FakePublish::refusing();
        let mut d = dispatcher(channel_config(false, true), &FakeRequest::responding(Ok(200)), &publish);

        let report = d.dispatch(&payload()).await;
        assert_eq!(report.publish, DeliveryOutcome::Failed);
        assert_eq!(publish.connect_attempts(), 1);
        assert!(publish.published().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_publish_fails() {
        let publish = FakePublish::connected();
        publish.reject_publishes();
        let mut d = dispatcher(channel_config(false, true), &FakeRequest::responding(Ok(200)), &publish);
        assert_eq!(d.dispatch(&payload()).await.publish, DeliveryOutcome::Failed);
    }

    #[tokio::test]
    async fn test_both_disabled_is_not_delivered() {
        let request = FakeRequest::responding(Ok(200));
        let mut d = dispatcher(channel_config(false, false), &request, &FakePublish::connected());
        let report = d.dispatch(&payload()).await;
        assert_eq!(report, DispatchReport { request: DeliveryOutcome::Skipped, publish: DeliveryOutcome::Skipped });
        assert!(!report.delivered());
        assert!(request.posts().is_empty());
    }
}
