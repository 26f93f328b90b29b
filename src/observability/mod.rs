//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured events to stderr, secret redaction)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Tool invocations:
//!     → one span per call carrying its trace id
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Trace id flows from the tool boundary into every event below it
//! - Metrics are cheap no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
