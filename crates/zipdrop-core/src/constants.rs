//! Shared constants

/// Versioned prefix of every media route
pub const API_PREFIX: &str = "/api/v0";

/// Counter-store key namespace for per-media download counts
pub const DOWNLOAD_COUNTER_PREFIX: &str = "downloads";

/// Counter-store key namespace for rate-limit buckets
pub const RATE_LIMIT_PREFIX: &str = "rl";

/// Rate-limit scope names
pub const SCOPE_GENERAL: &str = "general";
pub const SCOPE_DOWNLOAD: &str = "download";
pub const SCOPE_SWEEP: &str = "sweep";

/// Collaborator names used in `UpstreamUnavailable` errors and logs
pub const SERVICE_METADATA_STORE: &str = "metadata store";
pub const SERVICE_COUNTER_STORE: &str = "counter store";
pub const SERVICE_BLOB_STORE: &str = "blob store";
