//! Per-IP submission throttling.
//!
//! A sliding window of submission timestamps is kept per client in a
//! key-value store with TTL. Clients that look like shared addresses
//! (offices, NAT gateways) get a larger allowance.

pub mod clock;
pub mod config;
pub mod context;
pub mod limiter;
pub mod store;
pub mod usage;

pub use clock::*;
pub use config::*;
pub use context::*;
pub use limiter::*;
pub use store::*;
pub use usage::*;
