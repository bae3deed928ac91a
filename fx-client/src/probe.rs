//! Connectivity checks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::net::TcpStream;
use tracing::debug;

use fx_types::Connectivity;

/// Reports online when a TCP connection to the API host succeeds in time.
#[derive(Debug, Clone)]
pub struct NetworkProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Probes the host of `url`, using the scheme's default port when none is given.
    pub fn for_url(url: &str, timeout: Duration) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        let port = parsed.port_or_known_default()?;
        Some(Self::new(host, port, timeout))
    }
}

#[async_trait]
impl Connectivity for NetworkProbe {
    async fn is_online(&self) -> bool {
        let attempt = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, attempt).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(host = %self.host, port = self.port, error = %e, "Probe failed");
                false
            }
            Err(_) => {
                debug!(host = %self.host, port = self.port, "Probe timed out");
                false
            }
        }
    }
}

/// Connectivity answer fixed at construction (e.g. a forced offline mode).
#[derive(Debug, Clone, Copy)]
pub struct FixedConnectivity(pub bool);

#[async_trait]
impl Connectivity for FixedConnectivity {
    async fn is_online(&self) -> bool {
        self.0
    }
}
