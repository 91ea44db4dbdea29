//! Usage profiles for shared-IP detection.

use serde::{Deserialize, Serialize};

use crate::config::SharedIpConfig;

/// Seconds per hour.
const HOUR_SECS: f64 = 3600.0;

/// What has been seen from one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageProfile {
    /// Distinct form contexts (referer paths)
    pub form_contexts: Vec<String>,
    /// Distinct coarse user agent fingerprints
    pub user_agents: Vec<String>,
    /// UNIX time the address was first seen
    pub first_seen: i64,
}

impl UsageProfile {
    pub fn new(first_seen: i64) -> Self {
        Self {
            form_contexts: Vec::new(),
            user_agents: Vec::new(),
            first_seen,
        }
    }

    /// Record a request. Duplicates are ignored.
    pub fn observe(&mut self, form_context: String, user_agent: String) {
        if !self.form_contexts.contains(&form_context) {
            self.form_contexts.push(form_context);
        }
        if !self.user_agents.contains(&user_agent) {
            self.user_agents.push(user_agent);
        }
    }

    pub fn age_hours(&self, now: i64) -> f64 {
        (now - self.first_seen) as f64 / HOUR_SECS
    }

    /// Many browsers, or several forms over a sustained period.
    pub fn looks_shared(&self, config: &SharedIpConfig, now: i64) -> bool {
        self.user_agents.len() >= config.min_user_agents
            || (self.form_contexts.len() >= config.min_form_contexts
                && self.age_hours(now) >= config.min_age_hours)
    }
}
