//! Delivery configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Which repository backend stores submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

/// Submission storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// JSON lines file for the file backend
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_path() -> PathBuf {
    PathBuf::from("data/submissions.jsonl")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_path(),
        }
    }
}

/// Administrator notification settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationConfig {
    /// When disabled, submissions count as delivered without sending anything
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Addresses that receive notifications
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Site name used in the subject line
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Subject template; `{site}` is replaced with the site name
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Endpoint that receives notifications as JSON
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Webhook request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_site_name() -> String {
    "Website".to_string()
}

fn default_subject() -> String {
    "[{site}] New Form Submission".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            recipients: Vec::new(),
            site_name: default_site_name(),
            subject: default_subject(),
            webhook_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NotificationConfig {
    /// Subject line with the site name filled in.
    pub fn subject_line(&self) -> String {
        self.subject.replace("{site}", &self.site_name)
    }
}
