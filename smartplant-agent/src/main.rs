//! SmartPlant Agent - entry point
//!
//! Loads configuration, wires the host drivers and runs the scheduling
//! loop on a single-threaded runtime until Ctrl-C.

use anyhow::{Context, Result};
use smartplant_agent::drivers::http::{build_client, HttpConfigSource, HttpRequestChannel};
use smartplant_agent::drivers::indicator;
use smartplant_agent::drivers::link::InterfaceLink;
use smartplant_agent::drivers::mqtt::{default_client_id, MqttPublisher};
use smartplant_agent::drivers::sensor::FileSensor;
use smartplant_agent::{Agent, AgentConfig, Collaborators, MonotonicClock};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smartplant_agent=info")),
        )
        .init();

    info!("SmartPlant agent v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = AgentConfig::load().await.context("Failed to load configuration")?;
    let client = build_client(config.http.timeout_secs).context("Failed to build HTTP client")?;
    let client_id = config.mqtt.client_id.clone().unwrap_or_else(default_client_id);
    info!(device = %config.device.name, location = %config.device.location, %client_id, "configuration loaded");

    let parts = Collaborators {
        sensor: Box::new(FileSensor::from_config(&config.sensor)),
        link: Box::new(InterfaceLink::from_config(&config.link)),
        request: Box::new(HttpRequestChannel::new(client.clone())),
        publish: Box::new(MqttPublisher::from_config(&config.mqtt)),
        config_source: Box::new(HttpConfigSource::new(client, config.remote_config.url.clone())),
        indicator: indicator::from_config(&config.indicator),
        clock: Box::new(MonotonicClock::new()),
    };

    let agent = Agent::new(&config, client_id, parts);
    agent
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("SmartPlant agent stopped");
    Ok(())
}
