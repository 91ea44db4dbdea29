//! Admin-supplied regex pattern checks.
//!
//! Patterns come from form settings, not from code, so they are screened
//! before compilation: overlong patterns and the constructs in
//! [`DENIED_PATTERN_CONSTRUCTS`] are refused outright.

use moka::sync::Cache;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::field_config::FieldConfig;
use crate::limits::{DENIED_PATTERN_CONSTRUCTS, PATTERN_SIZE_LIMIT};
use crate::messages::Messages;

/// Compiled pattern cache capacity.
const PATTERN_CACHE_MAX_CAPACITY: u64 = 1_000;

/// Validates values against a field's `pattern`.
#[derive(Clone)]
pub struct PatternValidator {
    max_pattern_length: usize,
    messages: Arc<Messages>,
    /// Screened pattern source -> compiled regex
    compiled: Cache<String, Arc<Regex>>,
}

impl PatternValidator {
    pub fn new(max_pattern_length: usize, messages: Arc<Messages>) -> Self {
        Self {
            max_pattern_length,
            messages,
            compiled: Cache::builder()
                .max_capacity(PATTERN_CACHE_MAX_CAPACITY)
                .build(),
        }
    }

    /// Returns an error message if the value does not satisfy the pattern.
    pub fn validate(&self, value: &str, config: &FieldConfig) -> Option<String> {
        let pattern = match config.pattern.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => return None,
        };

        let Some(screened) = self.sanitize_pattern(pattern) else {
            return Some(self.messages.invalid_pattern.clone());
        };

        if self.is_match(value, &screened) {
            None
        } else {
            Some(
                config
                    .invalid_message
                    .clone()
                    .unwrap_or_else(|| self.messages.invalid_value.clone()),
            )
        }
    }

    /// Screen a pattern. The denylist runs on the pattern as written, before escaping.
    pub fn sanitize_pattern(&self, pattern: &str) -> Option<String> {
        if pattern.len() > self.max_pattern_length {
            return None;
        }

        if DENIED_PATTERN_CONSTRUCTS
            .iter()
            .any(|denied| pattern.contains(denied))
        {
            return None;
        }

        Some(pattern.replace("/\\/", "\\/").replace('~', "\\~"))
    }

    /// Compile failures count as a mismatch.
    fn is_match(&self, value: &str, pattern: &str) -> bool {
        match self.compile(pattern) {
            Some(regex) => regex.is_match(value),
            None => false,
        }
    }

    fn compile(&self, pattern: &str) -> Option<Arc<Regex>> {
        if let Some(regex) = self.compiled.get(pattern) {
            return Some(regex);
        }

        match RegexBuilder::new(pattern)
            .unicode(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => {
                let regex = Arc::new(regex);
                self.compiled.insert(pattern.to_string(), regex.clone());
                Some(regex)
            }
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "Field pattern failed to compile");
                None
            }
        }
    }
}
