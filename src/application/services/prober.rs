//! Connectivity probes against the backend health endpoint

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::application::diagnostics::{ConnectionIndicator, DiagnosticLog};
use crate::domain::{ConnectionState, Endpoint, FailureReport};
use crate::infrastructure::traits::HttpTransport;

/// Result of a timed probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Connected,
    /// Backend answered with a non-2xx status
    HttpStatus(u16),
    /// Transport failure
    Failed(String),
    TimedOut(Duration),
}

impl ProbeOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ProbeOutcome::Connected)
    }

    /// Indicator state for this outcome.
    pub fn state(&self) -> ConnectionState {
        match self {
            ProbeOutcome::Connected => ConnectionState::connected("Connected"),
            ProbeOutcome::HttpStatus(code) => {
                ConnectionState::disconnected(format!("Error: API returned status {code}"))
            }
            ProbeOutcome::Failed(msg) => ConnectionState::disconnected(format!("Error: {msg}")),
            ProbeOutcome::TimedOut(after) => ConnectionState::disconnected(format!(
                "Error: connection timed out after {}s",
                after.as_secs()
            )),
        }
    }
}

/// Result of the direct probe.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectProbeOutcome {
    /// Decoded health response body
    Reachable(serde_json::Value),
    Unreachable(FailureReport),
}

pub struct ConnectivityProber {
    transport: Arc<dyn HttpTransport>,
    endpoint: Endpoint,
    timeout: Duration,
    indicator: Arc<ConnectionIndicator>,
    log: Arc<DiagnosticLog>,
}

impl ConnectivityProber {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        endpoint: Endpoint,
        timeout: Duration,
        indicator: Arc<ConnectionIndicator>,
        log: Arc<DiagnosticLog>,
    ) -> Self {
        Self {
            transport,
            endpoint,
            timeout,
            indicator,
            log,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Bounded health check; the request is dropped when the timeout expires.
    #[instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn probe(&self) -> ProbeOutcome {
        self.indicator.set(ConnectionState::checking());
        let url = self.endpoint.url(&["ping"]);
        self.log.record(format!("Checking API connection at: {url}"));

        let outcome = match tokio::time::timeout(self.timeout, self.transport.get(&url)).await {
            Err(_elapsed) => ProbeOutcome::TimedOut(self.timeout),
            Ok(Err(e)) => ProbeOutcome::Failed(e.to_string()),
            Ok(Ok(response)) if response.is_success() => ProbeOutcome::Connected,
            Ok(Ok(response)) => ProbeOutcome::HttpStatus(response.status),
        };

        let state = outcome.state();
        if outcome.is_connected() {
            debug!("probe succeeded");
        } else {
            warn!("probe failed: {}", state.message);
        }
        self.log.record(format!("API check: {}", state.message));
        self.indicator.set(state);
        outcome
    }

    /// Health check decoding the response body, bounded by the same timeout
    /// as [`probe`](Self::probe).
    #[instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn direct_probe(&self) -> DirectProbeOutcome {
        self.log.record("Testing direct API fetch...");
        let url = self.endpoint.url(&["ping"]);

        let result = match tokio::time::timeout(self.timeout, self.transport.get(&url)).await {
            Err(_elapsed) => Err(format!(
                "connection timed out after {}s",
                self.timeout.as_secs()
            )),
            Ok(Ok(response)) if response.is_success() => response
                .json::<serde_json::Value>()
                .map_err(|e| e.to_string()),
            Ok(Ok(response)) => Err(format!("API returned status {}", response.status)),
            Ok(Err(e)) => Err(e.to_string()),
        };

        match result {
            Ok(body) => {
                self.log
                    .record(format!("Direct API test succeeded: {body}"));
                self.indicator
                    .set(ConnectionState::connected("Connected directly"));
                DirectProbeOutcome::Reachable(body)
            }
            Err(msg) => {
                warn!("direct probe failed: {}", msg);
                self.log.record(format!("Direct API test failed: {msg}"));
                self.indicator.set(ConnectionState::disconnected(format!(
                    "Direct test failed: {msg}"
                )));
                DirectProbeOutcome::Unreachable(FailureReport::unreachable(msg, &self.endpoint))
            }
        }
    }
}
