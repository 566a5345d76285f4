//! Zipdrop API Library
//!
//! HTTP surface of the engine: capability resolution, the general-traffic rate limit,
//! JSON handlers and application setup.

mod api_doc;
mod handlers;
mod middleware;
mod utils;

pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
