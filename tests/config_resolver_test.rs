//! Tests for ConfigResolver and the session bootstrap

mod common;

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;

use bodmas_viz::application::services::{ConfigResolver, Session};
use bodmas_viz::application::DiagnosticLog;
use bodmas_viz::config::Settings;
use bodmas_viz::domain::Endpoint;
use bodmas_viz::infrastructure::{HttpResponse, TransportError};

use common::{container, MockTransport, Reply};

const CONFIG_TIMEOUT: Duration = Duration::from_secs(5);

fn origin() -> Endpoint {
    Endpoint::parse("http://127.0.0.1:8080").unwrap()
}

#[tokio::test]
async fn given_config_with_backend_when_resolving_then_backend_replaced() {
    let transport = Arc::new(MockTransport::new().on_get(
        "/config.json",
        200,
        r#"{"BACKEND_URL": "https://bodmasparser.onrender.com", "VERSION": "1.0.0", "DEBUG": false}"#,
    ));
    let resolver = ConfigResolver::new(transport.clone(), CONFIG_TIMEOUT, Arc::new(DiagnosticLog::new()));

    let endpoint = resolver.resolve(&origin(), Endpoint::default()).await;

    assert_eq!(endpoint.as_str(), "https://bodmasparser.onrender.com");
    assert_eq!(transport.calls()[0].url, "http://127.0.0.1:8080/config.json");
}

#[rstest]
#[case::not_found(404, r#"{"BACKEND_URL": "http://elsewhere:1"}"#)]
#[case::not_json(200, "<html></html>")]
#[case::missing_field(200, r#"{"VERSION": "1.0.0"}"#)]
#[case::empty_field(200, r#"{"BACKEND_URL": ""}"#)]
#[case::not_a_url(200, r#"{"BACKEND_URL": "not a url"}"#)]
#[case::wrong_type(200, r#"{"BACKEND_URL": 42}"#)]
#[tokio::test]
async fn given_unusable_config_when_resolving_then_current_kept(
    #[case] status: u16,
    #[case] body: &str,
) {
    let transport = Arc::new(MockTransport::new().on_get("/config.json", status, body));
    let resolver = ConfigResolver::new(transport, CONFIG_TIMEOUT, Arc::new(DiagnosticLog::new()));
    let current = Endpoint::parse("http://10.0.0.1:8000").unwrap();

    let endpoint = resolver.resolve(&origin(), current.clone()).await;

    assert_eq!(endpoint, current);
}

#[tokio::test]
async fn given_transport_failure_when_resolving_then_current_kept() {
    let transport = Arc::new(MockTransport::new().on(
        "GET",
        "/config.json",
        Reply::Fail(TransportError::Timeout),
    ));
    let log = Arc::new(DiagnosticLog::new());
    let resolver = ConfigResolver::new(transport, CONFIG_TIMEOUT, log.clone());

    let endpoint = resolver.resolve(&origin(), Endpoint::default()).await;

    assert_eq!(endpoint, Endpoint::default());
    assert_eq!(log.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn given_stalled_config_when_resolving_then_current_kept_after_timeout() {
    // Arrange
    let transport = Arc::new(MockTransport::new().on(
        "GET",
        "/config.json",
        Reply::Delayed(
            Duration::from_secs(3600),
            HttpResponse::new(200, r#"{"BACKEND_URL": "http://late:1"}"#),
        ),
    ));
    let log = Arc::new(DiagnosticLog::new());
    let resolver = ConfigResolver::new(transport, CONFIG_TIMEOUT, log.clone());
    let started = tokio::time::Instant::now();

    // Act
    let endpoint = resolver.resolve(&origin(), Endpoint::default()).await;

    // Assert
    assert_eq!(endpoint, Endpoint::default());
    let elapsed = started.elapsed();
    assert!(elapsed >= CONFIG_TIMEOUT && elapsed < Duration::from_secs(6));
    assert!(log.lines()[0].contains("timed out after 5s"));
}

#[tokio::test(start_paused = true)]
async fn given_stalled_config_when_bootstrapping_then_default_backend_used() {
    // Arrange
    let transport = Arc::new(MockTransport::new().on(
        "GET",
        "/config.json",
        Reply::Delayed(Duration::from_secs(3600), HttpResponse::new(200, "{}")),
    ));
    let settings = Settings {
        frontend_origin: Some("http://frontend.test".into()),
        config_timeout_secs: 2,
        ..Settings::default()
    };
    let container = container(transport, settings);

    // Act
    let session = tokio::time::timeout(Duration::from_secs(60), Session::bootstrap(&container))
        .await
        .expect("bootstrap must not hang on a stalled origin")
        .unwrap();

    // Assert
    assert_eq!(session.backend(), &Endpoint::default());
}

#[tokio::test]
async fn given_origin_configured_when_bootstrapping_then_services_use_resolved_backend() {
    let transport = Arc::new(
        MockTransport::new()
            .on_get(
                "/config.json",
                200,
                r#"{"BACKEND_URL": "http://backend.test:9000/"}"#,
            )
            .on_get("/ping", 200, "{}"),
    );
    let settings = Settings {
        frontend_origin: Some("http://frontend.test".into()),
        ..Settings::default()
    };
    let container = container(transport.clone(), settings);

    let mut session = Session::bootstrap(&container).await.unwrap();
    session.ping().await;

    assert_eq!(session.backend().as_str(), "http://backend.test:9000");
    let calls = transport.calls();
    assert_eq!(calls[0].url, "http://frontend.test/config.json");
    assert!(calls[1..]
        .iter()
        .all(|c| c.url == "http://backend.test:9000/ping"));
}

#[tokio::test]
async fn given_no_origin_when_bootstrapping_then_config_resolution_skipped() {
    let transport = Arc::new(MockTransport::new());
    let container = container(transport.clone(), Settings::default());

    let session = Session::bootstrap(&container).await.unwrap();

    assert_eq!(session.backend(), &Endpoint::default());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn given_invalid_backend_setting_when_bootstrapping_then_error() {
    let settings = Settings {
        backend_url: "ftp://nope".into(),
        ..Settings::default()
    };
    let container = container(Arc::new(MockTransport::new()), settings);

    let result = Session::bootstrap(&container).await;

    assert!(result.is_err());
}
