//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! REST attempt:
//!     → timeouts.rs (race the attempt against its deadline)
//!     → On failure: retries.rs (retryable? attempts left?)
//!     → backoff.rs (sleep base * 2^(n-1), then try again)
//! ```
//!
//! # Design Decisions
//! - Every REST call has a deadline unless explicitly disabled
//! - Retries only for conditions safe to repeat, never for chain broadcasts
//! - Attempts for one call never overlap

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{is_retryable_status, RetryPolicy};
pub use timeouts::{run_with_timeout, AttemptOutcome};
