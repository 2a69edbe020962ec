//! Network link detection from interface addresses

use async_trait::async_trait;
use if_addrs::get_if_addrs;
use std::time::Duration;
use tracing::{debug, info};

use super::Link;
use crate::config::LinkConfig;
use crate::error::LinkError;

/// Up when a non-loopback interface (optionally a named one) has an address.
pub struct InterfaceLink {
    interface: Option<String>,
    retries: u32,
    retry_delay: Duration,
}

impl InterfaceLink {
    pub fn from_config(config: &LinkConfig) -> Self {
        Self {
            interface: config.interface.clone(),
            retries: config.retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_millis),
        }
    }

    fn probe(&self) -> Result<bool, LinkError> {
        let interfaces = get_if_addrs().map_err(|e| LinkError::Interfaces(e.to_string()))?;
        Ok(interfaces
            .iter()
            .filter(|iface| !iface.is_loopback())
            .any(|iface| self.interface.as_deref().map_or(true, |name| iface.name == name)))
    }
}

#[async_trait]
impl Link for InterfaceLink {
    fn is_connected(&self) -> bool {
        self.probe().unwrap_or(false)
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        for attempt in 1..=self.retries {
            if self.probe()? {
                info!(attempt, "network link up");
                return Ok(());
            }
            debug!(attempt, "waiting for network link");
            tokio::time::sleep(self.retry_delay).await;
        }
        Err(LinkError::Unavailable { attempts: self.retries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_interface_gives_up_after_retries() {
        let mut link = InterfaceLink::from_config(&LinkConfig {
            interface: Some("smartplant-does-not-exist0".into()),
            retries: 3,
            retry_delay_millis: 1,
        });
        assert!(!link.is_connected());
        assert_eq!(link.connect().await, Err(LinkError::Unavailable { attempts: 3 }));
    }
}
