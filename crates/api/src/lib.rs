//! HTTP API layer for form intake.

pub mod client_ip;
pub mod config;
pub mod extractors;
pub mod handler;
pub mod nonce;
pub mod response;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, SecurityConfig};
pub use handler::{ClientInfo, SubmissionHandler, SubmitRequest};
pub use nonce::NonceGuard;
pub use routes::router;
pub use state::AppState;
