//! Metrics collection.
//!
//! # Metrics
//! - `tmrw_http_attempts_total` (counter): REST attempts by method, outcome
//! - `tmrw_http_request_duration_seconds` (histogram): per-attempt latency
//! - `tmrw_token_exchanges_total` (counter): token exchanges by outcome
//! - `tmrw_tx_polls_total` (counter): transaction result polls
//! - `tmrw_rpc_pool_size` (gauge): cached chain node clients
//!
//! # Design Decisions
//! - No exporter is installed here; without a global recorder every call is a no-op
//! - Label values are static strings where possible

use std::time::Duration;

pub fn record_http_attempt(method: &str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(
        "tmrw_http_attempts_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("tmrw_http_request_duration_seconds", "method" => method.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_token_exchange(outcome: &'static str) {
    metrics::counter!("tmrw_token_exchanges_total", "outcome" => outcome).increment(1);
}

pub fn record_tx_poll(status: &str) {
    let status = if status.is_empty() { "UNKNOWN" } else { status };
    metrics::counter!("tmrw_tx_polls_total", "status" => status.to_string()).increment(1);
}

pub fn set_rpc_pool_size(size: usize) {
    metrics::gauge!("tmrw_rpc_pool_size").set(size as f64);
}
