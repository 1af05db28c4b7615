//! Shared test doubles

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use bodmas_viz::application::{ConnectionIndicator, DiagnosticLog};
use bodmas_viz::config::Settings;
use bodmas_viz::infrastructure::di::ServiceContainer;
use bodmas_viz::infrastructure::{HttpResponse, HttpTransport, RealFileSystem, TransportError};
use bodmas_viz::util::testing;

#[derive(Debug, Clone)]
pub enum Reply {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Respond after a delay
    Delayed(Duration, HttpResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

/// Canned HTTP transport keyed by method and path. Unknown routes get a
/// connection error.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(&'static str, String), Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: &'static str, path: &str, reply: Reply) -> Self {
        self.reroute(method, path, reply);
        self
    }

    /// Replace a route on a transport already handed to a session.
    pub fn reroute(&self, method: &'static str, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), reply);
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, Reply::Respond(HttpResponse::new(status, body)))
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, Reply::Respond(HttpResponse::new(status, body)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| Url::parse(&c.url).map(|u| u.path() == path).unwrap_or(false))
            .count()
    }

    async fn answer(
        &self,
        method: &'static str,
        url: &Url,
        body: Option<&Value>,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        let reply = self
            .routes
            .lock()
            .unwrap()
            .get(&(method, url.path().to_string()))
            .cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(e)) => Err(e),
            Some(Reply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Err(TransportError::Connect("Failed to fetch".into())),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        self.answer("GET", url, None).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<HttpResponse, TransportError> {
        self.answer("POST", url, Some(body)).await
    }
}

pub const PING_OK: &str = r#"{"status": "ok", "message": "API is operational"}"#;

pub const PARSE_3_PLUS_4_TIMES_5: &str = r#"{
    "postfix": ["3", "4", "5", "*", "+"],
    "parse_tree": {"operator": "+", "left": "3", "right": {"operator": "*", "left": "4", "right": "5"}},
    "result": 23.0,
    "input_expression": "3+4*5",
    "valid": true,
    "error": null
}"#;

pub const REJECT_CONSECUTIVE: &str = r#"{
    "postfix": [],
    "parse_tree": {},
    "result": 0.0,
    "input_expression": "3++4",
    "valid": false,
    "error": "Consecutive operators found"
}"#;

pub fn shared_state() -> (Arc<ConnectionIndicator>, Arc<DiagnosticLog>) {
    testing::init_test_setup();
    (
        Arc::new(ConnectionIndicator::new()),
        Arc::new(DiagnosticLog::new()),
    )
}

pub fn container(transport: Arc<MockTransport>, settings: Settings) -> ServiceContainer {
    ServiceContainer::with_deps(settings, transport, Arc::new(RealFileSystem))
}
