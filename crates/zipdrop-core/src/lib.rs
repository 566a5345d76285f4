//! Zipdrop Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, clock and
//! access policy shared by every zipdrop component.

pub mod access;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use access::AccessPolicy;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, RateLimitSettings, ScopeLimit};
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel};
pub use models::{Capability, MediaRecord, MediaResponse, MediaUpdate, NewMedia, Visibility};
pub use storage_types::{StorageBackend, StoreBackend};
