//! Time-limited form tokens.
//!
//! A token is the hex SHA-256 of `secret|action|tick`, where the tick
//! advances every half lifetime. Tokens from the current and the previous
//! tick are accepted, so a token stays valid for between half and the full
//! lifetime.

use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use throttle::{Clock, SystemClock};

/// Action the submission endpoint verifies tokens for.
pub const SUBMIT_ACTION: &str = "form_submit";

/// Request header carrying the token.
pub const NONCE_HEADER: &str = "X-Form-Nonce";

/// Issues and verifies form tokens.
pub struct NonceGuard {
    secret: String,
    half_lifetime: i64,
    clock: Arc<dyn Clock>,
}

impl NonceGuard {
    pub fn new(secret: impl Into<String>, lifetime_secs: u64) -> Self {
        Self::with_clock(secret, lifetime_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: impl Into<String>, lifetime_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            half_lifetime: (lifetime_secs / 2).max(1) as i64,
            clock,
        }
    }

    /// Token for `action` valid from now.
    pub fn create(&self, action: &str) -> String {
        self.token(action, self.tick())
    }

    pub fn verify(&self, token: &str, action: &str) -> bool {
        let tick = self.tick();
        [tick, tick - 1]
            .into_iter()
            .any(|t| bool::from(token.as_bytes().ct_eq(self.token(action, t).as_bytes())))
    }

    fn tick(&self) -> i64 {
        self.clock.now().div_euclid(self.half_lifetime)
    }

    fn token(&self, action: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}
