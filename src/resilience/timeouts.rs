//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race one request attempt against a deadline
//! - Report the attempt as a tagged outcome instead of an error chain
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future aborts the request
//! - A zero deadline disables the timer
//! - Timeouts are distinct from other transport errors

use std::future::Future;
use std::time::Duration;

/// Result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Completed(T),
    /// The deadline elapsed first.
    TimedOut(Duration),
    NetworkError(reqwest::Error),
}

impl<T> AttemptOutcome<T> {
    /// Outcome label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::TimedOut(_) => "timeout",
            Self::NetworkError(_) => "network_error",
        }
    }
}

pub async fn run_with_timeout<T, F>(timeout_ms: u64, fut: F) -> AttemptOutcome<T>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    let bound = Duration::from_millis(timeout_ms);
    let result = if timeout_ms == 0 {
        fut.await
    } else {
        match tokio::time::timeout(bound, fut).await {
            Ok(result) => result,
            Err(_) => return AttemptOutcome::TimedOut(bound),
        }
    };

    match result {
        Ok(value) => AttemptOutcome::Completed(value),
        Err(e) if e.is_timeout() => AttemptOutcome::TimedOut(bound),
        Err(e) => AttemptOutcome::NetworkError(e),
    }
}
