//! The gateway call wrapper.
//!
//! Runs one operation, and on failure hands the fault to a [`FailureLog`]
//! with a fixed message before returning it in the error branch of an
//! [`Envelope`]. Nothing here retries, times out, or re-throws.

use std::future::Future;

use crate::envelope::Envelope;
use crate::error::CheckoutError;
use crate::log::FailureLog;

/// Run an async (HTTP) operation and normalize its result.
pub async fn call<T, F>(log: &dyn FailureLog, message: &'static str, op: F) -> Envelope<T>
where
    F: Future<Output = Result<T, CheckoutError>>,
{
    settle(log, message, op.await)
}

/// Run a synchronous (database) operation and normalize its result.
pub fn call_blocking<T, E, F>(log: &dyn FailureLog, message: &'static str, op: F) -> Envelope<T>
where
    E: Into<CheckoutError>,
    F: FnOnce() -> Result<T, E>,
{
    settle(log, message, op().map_err(Into::into))
}

/// Log a failed result and wrap either branch.
pub fn settle<T>(
    log: &dyn FailureLog,
    message: &'static str,
    result: Result<T, CheckoutError>,
) -> Envelope<T> {
    if let Err(ref e) = result {
        log.failure(message, e);
    }
    Envelope::from(result)
}

/// A failed step of a multi-step operation, tagged with that step's message.
#[derive(Debug)]
pub struct StepFailure {
    pub message: &'static str,
    pub error: CheckoutError,
}

/// `map_err` adapter that tags an error with the failing step's message.
pub fn step<E: Into<CheckoutError>>(message: &'static str) -> impl FnOnce(E) -> StepFailure {
    move |e| StepFailure {
        message,
        error: e.into(),
    }
}

/// Normalize the result of a multi-step operation. Only the first failing
/// step is logged and surfaced.
pub fn finish<T>(log: &dyn FailureLog, result: Result<T, StepFailure>) -> Envelope<T> {
    match result {
        Ok(data) => Envelope::ok(data),
        Err(StepFailure { message, error }) => settle(log, message, Err(error)),
    }
}
