//! Capability resolution from bearer tokens

pub mod jwt;
pub mod middleware;

pub use jwt::{JwtClaims, JwtService};
pub use middleware::{capability_middleware, Caller};
