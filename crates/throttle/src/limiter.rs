//! Sliding-window submission limiter.

use intake_core::ip::is_public_ip;
use intake_core::Result;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::ThrottleConfig;
use crate::context::RequestContext;
use crate::store::SharedStore;
use crate::usage::UsageProfile;

/// Key prefix for submission timestamp records.
pub const THROTTLE_KEY_PREFIX: &str = "form_intake_throttle_";

/// Key prefix for usage profiles.
pub const USAGE_KEY_PREFIX: &str = "form_intake_ip_usage_";

/// Hex characters of the address hash kept in throttle keys.
const THROTTLE_KEY_HASH_LEN: usize = 32;

/// Per-IP submission throttle.
///
/// Records are lists of UNIX timestamps, pruned to the window on every read
/// and write. Checking an address also updates its usage profile, so
/// repeated checks feed the shared-IP heuristic even without submissions.
pub struct Throttle {
    config: ThrottleConfig,
    store: SharedStore,
    clock: Arc<dyn Clock>,
}

impl Throttle {
    pub fn new(config: ThrottleConfig, store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Whether the address has used up its allowance.
    pub async fn is_throttled(&self, ip: &str, ctx: &RequestContext) -> bool {
        if !self.config.enabled {
            return false;
        }

        // Private and reserved ranges are local or development traffic
        if !is_public_ip(ip) {
            return false;
        }

        if self.config.whitelist.iter().any(|allowed| allowed == ip) {
            return false;
        }

        let base_limit = self.config.max_submissions;
        let count = self.submission_count(ip).await;
        let limit = self.adjusted_limit(ip, base_limit, ctx).await;

        debug!(count, limit, "Throttle check");
        count >= limit as usize
    }

    /// Record a submission from the address.
    pub async fn record_submission(&self, ip: &str) -> Result<()> {
        let key = self.throttle_key(ip);
        let mut timestamps = self.load_timestamps(&key).await?;

        timestamps.push(self.clock.now());
        let timestamps = self.prune(timestamps);

        self.store
            .set(&key, Value::from(timestamps), self.window())
            .await
    }

    /// Submissions inside the window. Pruned records are written back.
    pub async fn submission_count(&self, ip: &str) -> usize {
        let key = self.throttle_key(ip);

        let timestamps = match self.store.get(&key).await {
            Ok(Some(value)) => parse_timestamps(value),
            Ok(None) => return 0,
            Err(e) => {
                warn!(error = %e, "Failed to read throttle record");
                return 0;
            }
        };

        let timestamps = self.prune(timestamps);
        let count = timestamps.len();

        if let Err(e) = self
            .store
            .set(&key, Value::from(timestamps), self.window())
            .await
        {
            warn!(error = %e, "Failed to compact throttle record");
        }

        count
    }

    /// Submissions left before the base limit is reached.
    pub async fn remaining_submissions(&self, ip: &str) -> usize {
        let base_limit = self.config.max_submissions as usize;
        base_limit.saturating_sub(self.submission_count(ip).await)
    }

    /// Seconds until the oldest submission in the window expires, or 0 if not throttled.
    pub async fn time_until_next_allowed(&self, ip: &str, ctx: &RequestContext) -> u64 {
        if !self.is_throttled(ip, ctx).await {
            return 0;
        }

        let key = self.throttle_key(ip);
        let timestamps = match self.store.get(&key).await {
            Ok(Some(value)) => parse_timestamps(value),
            Ok(None) => return 0,
            Err(e) => {
                warn!(error = %e, "Failed to read throttle record");
                return 0;
            }
        };

        let window = self.config.window_secs as i64;
        let now = self.clock.now();
        let cutoff = now - window;

        match timestamps.into_iter().filter(|&ts| ts > cutoff).min() {
            Some(oldest) => (oldest + window - now).max(0) as u64,
            None => 0,
        }
    }

    /// Remove the address's throttle record.
    pub async fn clear(&self, ip: &str) -> Result<()> {
        self.store.delete(&self.throttle_key(ip)).await
    }

    /// Base limit, scaled up for likely shared addresses. Never below the base.
    pub async fn adjusted_limit(&self, ip: &str, base_limit: u32, ctx: &RequestContext) -> u32 {
        let multiplier = if self.is_likely_shared_ip(ip, ctx).await {
            self.config.shared_ip.multiplier
        } else {
            1
        };

        base_limit.max(base_limit.saturating_mul(multiplier))
    }

    /// Update the address's usage profile with this request and apply the heuristic.
    pub async fn is_likely_shared_ip(&self, ip: &str, ctx: &RequestContext) -> bool {
        let key = self.usage_key(ip);
        let now = self.clock.now();

        let mut profile = match self.store.get(&key).await {
            Ok(Some(value)) => {
                serde_json::from_value(value).unwrap_or_else(|_| UsageProfile::new(now))
            }
            Ok(None) => UsageProfile::new(now),
            Err(e) => {
                warn!(error = %e, "Failed to read usage profile");
                UsageProfile::new(now)
            }
        };

        profile.observe(ctx.form_context(), ctx.user_agent_fingerprint());

        match serde_json::to_value(&profile) {
            Ok(value) => {
                let ttl = Duration::from_secs(self.config.shared_ip.profile_ttl_secs);
                if let Err(e) = self.store.set(&key, value, ttl).await {
                    warn!(error = %e, "Failed to store usage profile");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode usage profile"),
        }

        profile.looks_shared(&self.config.shared_ip, now)
    }

    async fn load_timestamps(&self, key: &str) -> Result<Vec<i64>> {
        Ok(self
            .store
            .get(key)
            .await?
            .map(parse_timestamps)
            .unwrap_or_default())
    }

    fn prune(&self, mut timestamps: Vec<i64>) -> Vec<i64> {
        let cutoff = self.clock.now() - self.config.window_secs as i64;
        timestamps.retain(|&ts| ts > cutoff);
        timestamps
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.window_secs)
    }

    fn ip_hash(&self, ip: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(ip.as_bytes());
        hasher.update(self.config.secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn throttle_key(&self, ip: &str) -> String {
        let hash = self.ip_hash(ip);
        format!("{}{}", THROTTLE_KEY_PREFIX, &hash[..THROTTLE_KEY_HASH_LEN])
    }

    fn usage_key(&self, ip: &str) -> String {
        format!("{}{}", USAGE_KEY_PREFIX, self.ip_hash(ip))
    }
}

/// Unreadable records count as empty.
fn parse_timestamps(value: Value) -> Vec<i64> {
    serde_json::from_value(value).unwrap_or_default()
}

/// Shared throttle handle.
pub type SharedThrottle = Arc<Throttle>;
