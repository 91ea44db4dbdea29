//! Mock implementations for testing.

use async_trait::async_trait;
use delivery::{NewSubmission, Notifier, SubmissionRepository};
use intake_core::{Error, Result, SanitizedSubmission};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Repository that keeps saved submissions in memory.
///
/// Implements the same `SubmissionRepository` trait as the real backends,
/// so tests can inspect exactly what the pipeline would have stored.
#[derive(Clone)]
pub struct MockRepository {
    saved: Arc<Mutex<Vec<NewSubmission>>>,
    next_id: Arc<AtomicU64>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            saved: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Get all saved submissions.
    pub fn saved(&self) -> Vec<NewSubmission> {
        self.saved.lock().clone()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().len()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionRepository for MockRepository {
    async fn save(&self, submission: NewSubmission) -> Result<u64> {
        if *self.should_fail.lock() {
            return Err(Error::store("Mock repository failure"));
        }

        self.saved.lock().push(submission);
        Ok(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// A notification captured by [`MockNotifier`].
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub data: SanitizedSubmission,
    pub form_id: Option<String>,
    pub client_ip: String,
}

/// Notifier that records what it was asked to send.
#[derive(Clone)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    delivered: Arc<Mutex<bool>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            delivered: Arc::new(Mutex::new(true)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }

    /// Report notifications as not delivered without failing.
    pub fn set_delivered(&self, delivered: bool) {
        *self.delivered.lock() = delivered;
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(
        &self,
        data: &SanitizedSubmission,
        form_id: Option<&str>,
        client_ip: &str,
    ) -> Result<bool> {
        if *self.should_fail.lock() {
            return Err(Error::notification("Mock notifier failure"));
        }

        self.sent.lock().push(SentNotification {
            data: data.clone(),
            form_id: form_id.map(str::to_string),
            client_ip: client_ip.to_string(),
        });
        Ok(*self.delivered.lock())
    }
}
