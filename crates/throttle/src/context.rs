//! Request details used by the shared-IP heuristic.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Browser family and major version from a typical browser user agent.
static BROWSER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Mozilla.*?(Chrome|Firefox|Safari|Edge)/(\d+)").expect("invalid browser pattern")
});

/// Placeholder for missing request details.
pub const UNKNOWN: &str = "unknown";

/// Maximum fingerprint length for unrecognised user agents.
const RAW_FINGERPRINT_LEN: usize = 50;

/// Details of the current request, passed explicitly to the throttle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(referer: Option<String>, user_agent: Option<String>) -> Self {
        Self { referer, user_agent }
    }

    /// Path of the referring page, or `"unknown"`.
    pub fn form_context(&self) -> String {
        self.referer
            .as_deref()
            .and_then(|referer| Url::parse(referer.trim()).ok())
            .map(|url| url.path().to_string())
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Coarse browser fingerprint.
    pub fn user_agent_fingerprint(&self) -> String {
        match self.user_agent.as_deref().map(str::trim) {
            Some(ua) if !ua.is_empty() => fingerprint(ua),
            _ => UNKNOWN.to_string(),
        }
    }
}

/// `Browser/Major` for common browsers; otherwise the first 50 characters.
pub fn fingerprint(user_agent: &str) -> String {
    match BROWSER_REGEX.captures(user_agent) {
        Some(caps) => format!("{}/{}", &caps[1], &caps[2]),
        None => user_agent.chars().take(RAW_FINGERPRINT_LEN).collect(),
    }
}
