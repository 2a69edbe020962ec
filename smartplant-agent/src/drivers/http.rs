//! HTTP delivery channel and remote config source (reqwest)

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{ConfigSource, RequestChannel};
use crate::error::TransportError;

pub fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("smartplant-agent/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[derive(Clone)]
pub struct HttpRequestChannel {
    client: Client,
}

impl HttpRequestChannel {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestChannel for HttpRequestChannel {
    async fn post(&self, url: &str, content_type: &str, body: &str) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let code = response.status().as_u16();
        if let Ok(text) = response.text().await {
            debug!(code, body = %text, "HTTP response");
        }
        Ok(code)
    }
}

#[derive(Clone)]
pub struct HttpConfigSource {
    client: Client,
    url: String,
}

impl HttpConfigSource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<String, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        response.text().await.map_err(|e| TransportError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // port 9 (discard) on loopback is closed on test hosts
        let client = build_client(2).unwrap();
        let channel = HttpRequestChannel::new(client.clone());
        let result = channel.post("http://127.0.0.1:9/api/observations", "application/json", "{}").await;
        assert!(matches!(result, Err(TransportError::Request(_))));

        let source = HttpConfigSource::new(client, "http://127.0.0.1:9/api/config");
        assert!(matches!(source.fetch().await, Err(TransportError::Request(_))));
    }
}
