//! Backend address resolution from the frontend `config.json`

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::application::diagnostics::DiagnosticLog;
use crate::config::FrontendConfig;
use crate::domain::Endpoint;
use crate::infrastructure::traits::HttpTransport;

/// Resolves the backend address once, before any other request is made.
pub struct ConfigResolver {
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
    log: Arc<DiagnosticLog>,
}

impl ConfigResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, timeout: Duration, log: Arc<DiagnosticLog>) -> Self {
        Self {
            transport,
            timeout,
            log,
        }
    }

    /// Fetch `{origin}/config.json` and return its `BACKEND_URL`, or `current`
    /// on any failure. Never fails.
    #[instrument(level = "debug", skip(self), fields(origin = %origin))]
    pub async fn resolve(&self, origin: &Endpoint, current: Endpoint) -> Endpoint {
        match self.fetch(origin).await {
            Ok(endpoint) => {
                info!("backend address from config: {}", endpoint);
                self.log
                    .record(format!("Configuration loaded: BACKEND_URL={endpoint}"));
                endpoint
            }
            Err(reason) => {
                warn!("Failed to load configuration, using defaults: {}", reason);
                self.log
                    .record(format!("Using default backend {current}: {reason}"));
                current
            }
        }
    }

    async fn fetch(&self, origin: &Endpoint) -> Result<Endpoint, String> {
        let url = origin.url(&["config.json"]);
        let response = tokio::time::timeout(self.timeout, self.transport.get(&url))
            .await
            .map_err(|_| format!("fetch {url}: timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| format!("fetch {url}: {e}"))?;
        if !response.is_success() {
            return Err(format!("{url} returned status {}", response.status));
        }
        let doc: FrontendConfig = response
            .json()
            .map_err(|e| format!("decode {url}: {e}"))?;
        let backend = doc
            .backend()
            .ok_or_else(|| "BACKEND_URL missing or empty".to_string())?;
        Endpoint::parse(backend).map_err(|e| e.to_string())
    }
}
