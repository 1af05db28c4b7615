//! Service container for dependency injection
//!
//! Wires up shared state and I/O boundaries. Services that need the
//! resolved backend address are built later by the session bootstrap.

use std::sync::Arc;

use crate::application::diagnostics::{ConnectionIndicator, DiagnosticLog};
use crate::config::Settings;
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::traits::{FileSystem, HttpTransport, RealFileSystem, ReqwestTransport};

/// Container holding settings, shared state and I/O implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// HTTP client abstraction
    pub transport: Arc<dyn HttpTransport>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// User-visible, timestamped event log
    pub log: Arc<DiagnosticLog>,

    /// Connection indicator shared by prober and submission client
    pub indicator: Arc<ConnectionIndicator>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_deps(
            settings,
            Arc::new(transport),
            Arc::new(RealFileSystem),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            transport,
            fs,
            log: Arc::new(DiagnosticLog::new()),
            indicator: Arc::new(ConnectionIndicator::new()),
        }
    }
}
