//! TTL sweeper

mod service;

pub use service::{LifecycleSweeper, SweepFailure, SweepReport};
