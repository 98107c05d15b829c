//! Silent-renewal interval policy.
//!
//! The renewal tick must fire strictly before the access token expires. The
//! client is configured with a fixed interval; when the server reports a
//! token lifetime that the configured interval would not beat, an interval
//! is derived from the lifetime instead.

use std::time::Duration;

use thiserror::Error;

/// Fraction of the token lifetime used when the configured interval is
/// unusable (14 minutes out of 15).
const DERIVED_NUMERATOR: u32 = 14;
const DERIVED_DENOMINATOR: u32 = 15;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenewalPolicyError {
    #[error("renewal interval must be greater than zero")]
    ZeroInterval,

    #[error("renewal interval {interval:?} is not shorter than the token lifetime {ttl:?}")]
    NotShorterThanTtl { interval: Duration, ttl: Duration },
}

/// Deterministically validate a renewal interval against a token lifetime.
///
/// `ttl = None` means the server did not report a lifetime; only the
/// zero-interval check applies.
pub fn validate_renewal_interval(
    interval: Duration,
    ttl: Option<Duration>,
) -> Result<(), RenewalPolicyError> {
    if interval.is_zero() {
        return Err(RenewalPolicyError::ZeroInterval);
    }
    if let Some(ttl) = ttl {
        if interval >= ttl {
            return Err(RenewalPolicyError::NotShorterThanTtl { interval, ttl });
        }
    }
    Ok(())
}

/// Pick the interval the renewal timer should run at.
pub fn effective_renewal_interval(configured: Duration, ttl: Option<Duration>) -> Duration {
    match validate_renewal_interval(configured, ttl) {
        Ok(()) => configured,
        Err(err) => {
            let derived = match ttl {
                Some(ttl) => (ttl * DERIVED_NUMERATOR / DERIVED_DENOMINATOR).max(MIN_INTERVAL),
                None => MIN_INTERVAL,
            };
            tracing::warn!(
                error = %err,
                derived_secs = derived.as_secs_f64(),
                "configured renewal interval unusable; deriving one from the token lifetime"
            );
            derived
        }
    }
}
