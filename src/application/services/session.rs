//! Session: bootstrap, concurrent probes and submission, view updates

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::diagnostics::{ConnectionIndicator, DiagnosticLog};
use crate::application::services::config_resolver::ConfigResolver;
use crate::application::services::prober::{ConnectivityProber, DirectProbeOutcome, ProbeOutcome};
use crate::application::services::submission::{Submission, SubmissionClient};
use crate::application::view::ResultsView;
use crate::application::ApplicationResult;
use crate::domain::{ConnectionState, Endpoint};
use crate::infrastructure::di::ServiceContainer;
use crate::render::DiagramRenderer;

/// Everything one run produced.
#[derive(Debug)]
pub struct SessionOutcome {
    pub probe: ProbeOutcome,
    pub direct: DirectProbeOutcome,
    pub submission: ApplicationResult<Submission>,
}

/// Connectivity-only run.
#[derive(Debug)]
pub struct PingOutcome {
    pub probe: ProbeOutcome,
    pub direct: DirectProbeOutcome,
}

pub struct Session {
    backend: Endpoint,
    prober: ConnectivityProber,
    client: SubmissionClient,
    pub view: ResultsView,
    indicator: Arc<ConnectionIndicator>,
    log: Arc<DiagnosticLog>,
}

impl Session {
    /// Resolve the backend address, then build every service with it.
    #[instrument(level = "debug", skip(container))]
    pub async fn bootstrap(container: &ServiceContainer) -> ApplicationResult<Self> {
        let settings = &container.settings;
        let mut backend = settings.backend_endpoint()?;
        if let Some(origin) = settings.origin()? {
            let resolver = ConfigResolver::new(
                container.transport.clone(),
                settings.config_timeout(),
                container.log.clone(),
            );
            backend = resolver.resolve(&origin, backend).await;
        }
        debug!("backend resolved: {}", backend);
        container.log.record(format!("Using API URL: {backend}"));

        Ok(Self {
            prober: ConnectivityProber::new(
                container.transport.clone(),
                backend.clone(),
                settings.probe_timeout(),
                container.indicator.clone(),
                container.log.clone(),
            ),
            client: SubmissionClient::new(
                container.transport.clone(),
                backend.clone(),
                settings.submit_timeout(),
                container.indicator.clone(),
                container.log.clone(),
            ),
            view: ResultsView::new(DiagramRenderer::new(settings.canvas)),
            indicator: container.indicator.clone(),
            log: container.log.clone(),
            backend,
        })
    }

    pub fn backend(&self) -> &Endpoint {
        &self.backend
    }

    pub fn client(&self) -> &SubmissionClient {
        &self.client
    }

    pub fn connection(&self) -> ConnectionState {
        self.indicator.current()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.log.lines()
    }

    /// Run both probes and the submission concurrently; the submission is
    /// never gated on the probes.
    ///
    /// The submission outcome reaches the view as soon as it arrives and is
    /// never replaced by a probe result. An unreachable report is shown only
    /// when there is no submission outcome to show.
    #[instrument(level = "debug", skip(self))]
    pub async fn run(&mut self, expression: &str) -> SessionOutcome {
        if !expression.trim().is_empty() {
            self.view.begin_processing();
        }

        let client = &self.client;
        let view = &mut self.view;
        let submit = async {
            let outcome = client.submit(expression).await;
            if let Ok(submission) = &outcome {
                show_submission(view, submission);
                debug!("submission applied");
            }
            outcome
        };

        let (probe, direct, submission) =
            tokio::join!(self.prober.probe(), self.prober.direct_probe(), submit);

        if submission.is_err() {
            show_direct(&mut self.view, &direct);
        }
        SessionOutcome {
            probe,
            direct,
            submission,
        }
    }

    /// Run both probes without submitting anything.
    pub async fn ping(&mut self) -> PingOutcome {
        let (probe, direct) = tokio::join!(self.prober.probe(), self.prober.direct_probe());
        show_direct(&mut self.view, &direct);
        PingOutcome { probe, direct }
    }

    /// Submit alone, applying the outcome to the view.
    pub async fn submit(&mut self, expression: &str) -> ApplicationResult<Submission> {
        if !expression.trim().is_empty() {
            self.view.begin_processing();
        }
        let submission = self.client.submit(expression).await?;
        show_submission(&mut self.view, &submission);
        Ok(submission)
    }
}

fn show_direct(view: &mut ResultsView, direct: &DirectProbeOutcome) {
    if let DirectProbeOutcome::Unreachable(report) = direct {
        view.show_unreachable(report);
    }
}

fn show_submission(view: &mut ResultsView, submission: &Submission) {
    match submission {
        Submission::Parsed(success) => view.show_success(success),
        Submission::Rejected(report) => view.show_rejection(report),
        Submission::Failed(report) => view.show_connection_error(report),
    }
}
