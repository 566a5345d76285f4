//! Zipdrop Infrastructure Library
//!
//! Shared infrastructure used by the services and the API binary:
//! - Sliding-window rate limiting over the counter store
//! - Bounded calls to upstream collaborators
//! - Telemetry initialization
//! - HTTP error response shape

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;
pub mod upstream;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

pub use error::ErrorResponse;
pub use upstream::bounded;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{RateDecision, RateLimiter, RateScope};
