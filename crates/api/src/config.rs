//! HTTP layer configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApiConfig {
    /// Submission URL advertised to front ends
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    #[validate(range(min = 1024))]
    pub max_body_bytes: usize,
    #[serde(default)]
    #[validate(nested)]
    pub security: SecurityConfig,
}

fn default_public_url() -> String {
    "/submit".to_string()
}

fn default_max_body_bytes() -> usize {
    256 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
            max_body_bytes: default_max_body_bytes(),
            security: SecurityConfig::default(),
        }
    }
}

/// Request authenticity and client address settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecurityConfig {
    /// Require a valid form token on submissions
    #[serde(default = "default_nonce_required")]
    pub nonce_required: bool,
    #[serde(default = "default_nonce_secret")]
    pub nonce_secret: String,
    /// Token lifetime in seconds
    #[serde(default = "default_nonce_lifetime_secs")]
    #[validate(range(min = 2))]
    pub nonce_lifetime_secs: u64,
    /// Connecting addresses whose forwarded headers are trusted
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

fn default_nonce_required() -> bool {
    true
}

fn default_nonce_secret() -> String {
    "change-me".to_string()
}

fn default_nonce_lifetime_secs() -> u64 {
    86_400
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            nonce_required: default_nonce_required(),
            nonce_secret: default_nonce_secret(),
            nonce_lifetime_secs: default_nonce_lifetime_secs(),
            trusted_proxies: Vec::new(),
        }
    }
}
