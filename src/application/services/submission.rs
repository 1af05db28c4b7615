//! Expression submission client

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::application::diagnostics::{ConnectionIndicator, DiagnosticLog};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ConnectionState, Endpoint, FailureReport, ParseSuccess, ParseTreeNode};
use crate::infrastructure::traits::{HttpResponse, HttpTransport, TransportError};

/// Body of a `/parse` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseResponse {
    pub valid: bool,
    #[serde(default)]
    pub result: Option<f64>,
    #[serde(default)]
    pub postfix: Vec<String>,
    #[serde(default)]
    pub parse_tree: Value,
    #[serde(default)]
    pub input_expression: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
}

/// Resolved outcome of one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Parsed(ParseSuccess),
    /// Backend answered `valid: false`
    Rejected(FailureReport),
    /// Backend unreachable, non-2xx or unusable response
    Failed(FailureReport),
}

impl Submission {
    pub fn report(&self) -> Option<&FailureReport> {
        match self {
            Submission::Parsed(_) => None,
            Submission::Rejected(report) | Submission::Failed(report) => Some(report),
        }
    }
}

pub struct SubmissionClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: Endpoint,
    timeout: Duration,
    indicator: Arc<ConnectionIndicator>,
    log: Arc<DiagnosticLog>,
}

impl SubmissionClient {
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

    /// Submit `raw` for evaluation.
    ///
    /// Only an empty expression is an `Err`; every backend outcome is a
    /// [`Submission`].
    #[instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn submit(&self, raw: &str) -> ApplicationResult<Submission> {
        self.log.record("Starting to parse expression");
        let expression = raw.trim();
        if expression.is_empty() {
            self.log.record("Error: Empty expression");
            return Err(ApplicationError::EmptyExpression);
        }

        let url = self.endpoint.url(&["parse"]);
        self.log.record(format!("Sending to API: \"{expression}\""));
        let body = json!({ "expression": expression });

        let response = match tokio::time::timeout(self.timeout, self.transport.post_json(&url, &body)).await {
            Err(_elapsed) => {
                return Ok(self.fail(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
            Ok(Err(e)) => return Ok(self.fail(e.to_string())),
            Ok(Ok(response)) => response,
        };

        self.log
            .record(format!("API response status: {}", response.status));
        if !response.is_success() {
            return Ok(self.fail(format!("HTTP error! Status: {}", response.status)));
        }
        self.indicator.set(ConnectionState::connected("Connected"));
        Ok(self.interpret(&response))
    }

    fn interpret(&self, response: &HttpResponse) -> Submission {
        let parsed: ParseResponse = match response.json() {
            Ok(parsed) => parsed,
            Err(e) => return self.fail(format!("invalid response body: {e}")),
        };
        self.log.record("Received API response data");

        if !parsed.valid {
            let message = parsed.error.as_deref().unwrap_or("Unknown error");
            info!("expression rejected: {}", message);
            self.log.record(format!("Invalid expression: {message}"));
            return Submission::Rejected(FailureReport::explain(message));
        }

        let tree = match ParseTreeNode::from_wire(&parsed.parse_tree) {
            Ok(tree) => tree,
            Err(e) => return self.fail(e.to_string()),
        };
        let Some(result) = parsed.result else {
            return self.fail("response is missing 'result'".to_string());
        };
        debug!("parsed: result={} nodes={}", result, tree.node_count());
        self.log.record("Generating tree visualization");
        Submission::Parsed(ParseSuccess {
            result,
            postfix: parsed.postfix,
            tree,
            input_expression: parsed.input_expression,
        })
    }

    fn fail(&self, message: String) -> Submission {
        warn!("submission failed: {}", message);
        self.log.record(format!("Error: {message}"));
        self.indicator
            .set(ConnectionState::disconnected(format!("Error: {message}")));
        Submission::Failed(FailureReport::connectivity(message, &self.endpoint))
    }

    /// Ask the backend whether `raw` is a valid expression.
    #[instrument(level = "debug", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn validate(&self, raw: &str) -> ApplicationResult<bool> {
        let expression = raw.trim();
        if expression.is_empty() {
            return Err(ApplicationError::EmptyExpression);
        }
        let url = self.endpoint.url(&["validate", expression]);
        let context = format!("validate '{expression}' at {}", self.endpoint);

        let response = tokio::time::timeout(self.timeout, self.transport.get(&url))
            .await
            .map_err(|_| TransportError::Timeout)
            .and_then(|r| r)
            .map_err(|e| ApplicationError::OperationFailed {
                context: context.clone(),
                source: Box::new(e),
            })?;
        if !response.is_success() {
            return Err(ApplicationError::OperationFailed {
                context,
                source: format!("API returned status {}", response.status).into(),
            });
        }
        let body: ValidateResponse =
            response
                .json()
                .map_err(|e| ApplicationError::OperationFailed {
                    context,
                    source: Box::new(e),
                })?;
        self.log
            .record(format!("Validation of \"{expression}\": {}", body.valid));
        Ok(body.valid)
    }
}
