//! Shared display state: connection indicator and diagnostic log

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tracing::debug;

use crate::domain::ConnectionState;

/// Connection indicator; last writer wins.
#[derive(Debug)]
pub struct ConnectionIndicator {
    tx: watch::Sender<ConnectionState>,
}

impl Default for ConnectionIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionIndicator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::checking());
        Self { tx }
    }

    pub fn set(&self, state: ConnectionState) {
        debug!("connection: {:?} {}", state.status, state.message);
        self.tx.send_replace(state);
    }

    pub fn current(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] message`
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Append-only, timestamped event log shown to the user.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("{}", message);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                at: Local::now(),
                message,
            });
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(LogEntry::display_line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
