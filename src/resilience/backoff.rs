//! Exponential backoff.

use std::time::Duration;

/// Delay before retry number `attempt` (1-based): `base_ms * 2^(attempt-1)`.
///
/// No jitter; retries for one call are strictly sequential. Attempt 0 has no
/// delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    Duration::from_millis(base_ms.saturating_mul(exponential_base))
}
