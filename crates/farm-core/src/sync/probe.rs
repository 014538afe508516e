//! Reachability polling feeding `Connectivity`

use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinHandle;

use super::connectivity::Connectivity;
use super::remote::RemoteResult;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(15);

/// Polls an HTTP endpoint. Any HTTP response counts as online; only
/// transport failures (DNS, refused, timeout) count as offline.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    client: Client,
    url: String,
    interval: Duration,
}

impl ConnectivityProbe {
    pub fn new(url: impl Into<String>, interval: Duration, timeout: Duration) -> RemoteResult<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url: url.into(),
            interval,
        })
    }

    pub async fn check(&self) -> bool {
        match self.client.head(&self.url).send().await {
            Ok(_) => true,
            Err(error) => {
                tracing::debug!("Probe of {} failed: {error}", self.url);
                false
            }
        }
    }

    /// Poll until the returned task is aborted, publishing each result.
    pub fn spawn(self, connectivity: Connectivity) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let online = self.check().await;
                if connectivity.set_online(online) {
                    tracing::info!(
                        "Connectivity changed: {}",
                        if online { "online" } else { "offline" }
                    );
                }
                tokio::time::sleep(self.interval).await;
            }
        })
    }
}
