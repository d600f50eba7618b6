//! Failure logging for wrapper calls.
//!
//! Every wrapper routes its fault through a [`FailureLog`] before returning
//! the error envelope. The default sink is `tracing`; callers that want to
//! capture or suppress diagnostics inject their own.

use std::sync::Mutex;

use crate::error::{CheckoutError, FaultKind};

/// Sink for failed calls. Must never panic or fail.
pub trait FailureLog: Send + Sync {
    /// Record a failed call. `message` is the fixed, human-readable
    /// description of the operation that failed.
    fn failure(&self, message: &'static str, error: &CheckoutError);
}

/// Emits each failure as a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl FailureLog for TracingLog {
    fn failure(&self, message: &'static str, error: &CheckoutError) {
        tracing::error!(error = %error, kind = ?error.kind(), "{message}");
    }
}

/// Discards every failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLog;

impl FailureLog for SilentLog {
    fn failure(&self, _message: &'static str, _error: &CheckoutError) {}
}

/// One failure recorded by [`CapturedLog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedFailure {
    pub message: &'static str,
    pub error: String,
    pub kind: FaultKind,
}

/// Keeps failures in memory so callers (and tests) can inspect them.
#[derive(Debug, Default)]
pub struct CapturedLog {
    entries: Mutex<Vec<LoggedFailure>>,
}

impl CapturedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn entries(&self) -> Vec<LoggedFailure> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl FailureLog for CapturedLog {
    fn failure(&self, message: &'static str, error: &CheckoutError) {
        let entry = LoggedFailure {
            message,
            error: error.to_string(),
            kind: error.kind(),
        };
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
