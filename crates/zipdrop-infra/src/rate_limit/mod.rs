//! Rate limiting service
//!
//! Sliding-window throttle keyed by `(scope, identity)`, approximated with two
//! weighted fixed buckets held in the shared counter store.

pub use limiter::{RateDecision, RateLimiter, RateScope};

mod limiter;
