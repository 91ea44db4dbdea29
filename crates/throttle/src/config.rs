//! Throttle configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Submission throttling settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ThrottleConfig {
    /// Disable to never throttle
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Submissions allowed per window
    #[serde(default = "default_max_submissions")]
    #[validate(range(min = 1))]
    pub max_submissions: u32,
    /// Sliding window length in seconds
    #[serde(default = "default_window_secs")]
    #[validate(range(min = 1))]
    pub window_secs: u64,
    /// Addresses that are never throttled
    #[serde(default)]
    pub whitelist: Vec<String>,
    /// Secret mixed into record keys so stored keys do not reveal addresses
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Shared-IP detection
    #[serde(default)]
    #[validate(nested)]
    pub shared_ip: SharedIpConfig,
}

fn default_enabled() -> bool {
    true
}

fn default_max_submissions() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    3600
}

fn default_secret() -> String {
    "change-me".to_string()
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
            whitelist: Vec::new(),
            secret: default_secret(),
            shared_ip: SharedIpConfig::default(),
        }
    }
}

/// Heuristics for recognising addresses shared by many people.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SharedIpConfig {
    /// Limit multiplier for likely shared addresses
    #[serde(default = "default_multiplier")]
    #[validate(range(min = 1))]
    pub multiplier: u32,
    /// Distinct browser fingerprints that mark an address as shared
    #[serde(default = "default_min_user_agents")]
    pub min_user_agents: usize,
    /// Distinct form contexts that, with enough history, mark an address as shared
    #[serde(default = "default_min_form_contexts")]
    pub min_form_contexts: usize,
    /// Hours of history required alongside the form contexts
    #[serde(default = "default_min_age_hours")]
    pub min_age_hours: f64,
    /// Usage profile lifetime in seconds
    #[serde(default = "default_profile_ttl_secs")]
    #[validate(range(min = 1))]
    pub profile_ttl_secs: u64,
}

fn default_multiplier() -> u32 {
    3
}

fn default_min_user_agents() -> usize {
    3
}

fn default_min_form_contexts() -> usize {
    2
}

fn default_min_age_hours() -> f64 {
    2.0
}

fn default_profile_ttl_secs() -> u64 {
    86_400
}

impl Default for SharedIpConfig {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
            min_user_agents: default_min_user_agents(),
            min_form_contexts: default_min_form_contexts(),
            min_age_hours: default_min_age_hours(),
            profile_ttl_secs: default_profile_ttl_secs(),
        }
    }
}
