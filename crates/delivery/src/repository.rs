//! Submission persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intake_core::{Error, Result, SanitizedSubmission};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{StorageBackend, StorageConfig};

/// Fields whose values make up a submission title, in priority order.
const TITLE_FIELDS: [&str; 3] = ["name", "email", "subject"];

/// Title used when none of the title fields are present.
pub const DEFAULT_TITLE: &str = "Form Submission";

/// A sanitized submission ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubmission {
    pub form_id: Option<String>,
    pub data: SanitizedSubmission,
    pub client_ip: String,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub title: String,
    pub submitted_at: DateTime<Utc>,
}

impl NewSubmission {
    pub fn new(
        data: SanitizedSubmission,
        form_id: Option<String>,
        client_ip: impl Into<String>,
        user_agent: Option<String>,
        referer: Option<String>,
    ) -> Self {
        Self {
            title: submission_title(&data),
            form_id,
            data,
            client_ip: client_ip.into(),
            user_agent,
            referer,
            submitted_at: Utc::now(),
        }
    }
}

/// A stored submission with its assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: u64,
    #[serde(flatten)]
    pub submission: NewSubmission,
}

/// Name, email and subject values joined with `" - "`.
pub fn submission_title(data: &SanitizedSubmission) -> String {
    let parts: Vec<&str> = data
        .iter()
        .filter(|(id, value)| TITLE_FIELDS.contains(id) && !value.is_empty())
        .map(|(_, value)| value)
        .collect();

    if parts.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        parts.join(" - ")
    }
}

/// Storage for accepted submissions.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Store the submission and return its id.
    async fn save(&self, submission: NewSubmission) -> Result<u64>;

    /// Whether the backend can currently accept writes.
    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Shared repository handle.
pub type SharedRepository = Arc<dyn SubmissionRepository>;

/// Build the repository selected by configuration.
pub async fn build_repository(config: &StorageConfig) -> Result<SharedRepository> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryRepository::new())),
        StorageBackend::File => Ok(Arc::new(FileRepository::open(&config.path).await?)),
    }
}

/// Keeps submissions in process memory.
pub struct InMemoryRepository {
    next_id: AtomicU64,
    records: RwLock<Vec<StoredSubmission>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn all(&self) -> Vec<StoredSubmission> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn save(&self, submission: NewSubmission) -> Result<u64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.records.write().push(StoredSubmission { id, submission });
        debug!(id, "Stored submission in memory");
        Ok(id)
    }
}

/// Appends one JSON object per line to a file.
pub struct FileRepository {
    path: PathBuf,
    // Guards the append and the line count together
    next_id: Mutex<u64>,
}

impl FileRepository {
    /// Open (or create) the file. Ids continue after the existing lines.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let existing = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents.lines().filter(|l| !l.trim().is_empty()).count() as u64,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), existing, "Opened submission file");

        Ok(Self {
            path,
            next_id: Mutex::new(existing + 1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored submission back.
    pub async fn read_all(&self) -> Result<Vec<StoredSubmission>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }
}

#[async_trait]
impl SubmissionRepository for FileRepository {
    async fn save(&self, submission: NewSubmission) -> Result<u64> {
        let mut next_id = self.next_id.lock().await;
        let id = *next_id;

        let mut line = serde_json::to_string(&StoredSubmission { id, submission })?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::store(format!("{}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        *next_id += 1;
        debug!(id, "Appended submission");
        Ok(id)
    }

    async fn is_healthy(&self) -> bool {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => tokio::fs::metadata(parent).await.is_ok(),
            None => true,
        }
    }
}
