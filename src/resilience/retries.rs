//! Retry policy.
//!
//! # Responsibilities
//! - Decide whether a failed attempt may be retried
//! - Bound the number of attempts per verb
//!
//! # Design Decisions
//! - Timeouts and connection errors are always retryable
//! - Only 408, 425, 429 and 5xx responses are retryable
//! - POST is not assumed idempotent; it retries only when explicitly enabled

use reqwest::{Method, StatusCode};
use std::time::Duration;

use crate::config::schema::HttpConfig;
use crate::resilience::backoff::calculate_backoff;

pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 425 | 429) || status.is_server_error() || status.as_u16() >= 600
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Always at least 1.
    pub max_attempts: u32,
    pub base_ms: u64,
}

impl RetryPolicy {
    pub fn for_method(config: &HttpConfig, method: &Method) -> Self {
        let enabled = config.retry_max > 0 && (*method != Method::POST || config.retry_post);
        let max_attempts = if enabled {
            config.retry_max.saturating_add(1)
        } else {
            1
        };
        Self {
            max_attempts,
            base_ms: config.retry_base_ms,
        }
    }

    /// True when another attempt may follow `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before the attempt following `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for code in [408u16, 425, 429, 500, 502, 503, 504] {
            assert!(is_retryable_status(StatusCode::from_u16(code).unwrap()), "{}", code);
        }
        for code in [400u16, 401, 403, 404, 409, 422] {
            assert!(!is_retryable_status(StatusCode::from_u16(code).unwrap()), "{}", code);
        }
    }

    #[test]
    fn test_get_retries_when_retry_max_positive() {
        let config = HttpConfig {
            retry_max: 2,
            ..HttpConfig::default()
        };
        let policy = RetryPolicy::for_method(&config, &Method::GET);
        assert_eq!(policy.max_attempts, 3);
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_post_requires_flag() {
        let mut config = HttpConfig {
            retry_max: 2,
            ..HttpConfig::default()
        };
        assert_eq!(RetryPolicy::for_method(&config, &Method::POST).max_attempts, 1);
        config.retry_post = true;
        assert_eq!(RetryPolicy::for_method(&config, &Method::POST).max_attempts, 3);
    }

    #[test]
    fn test_zero_retry_max_means_single_attempt() {
        let config = HttpConfig {
            retry_max: 0,
            retry_post: true,
            ..HttpConfig::default()
        };
        assert_eq!(RetryPolicy::for_method(&config, &Method::GET).max_attempts, 1);
        assert_eq!(RetryPolicy::for_method(&config, &Method::POST).max_attempts, 1);
    }

    #[test]
    fn test_policy_backoff() {
        let policy = RetryPolicy::for_method(&HttpConfig::default(), &Method::GET);
        assert_eq!(policy.backoff(1).as_millis(), 200);
        assert_eq!(policy.backoff(2).as_millis(), 400);
    }
}
