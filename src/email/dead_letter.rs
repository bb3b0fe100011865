//! Notifications that could not be delivered.
//!
//! A send that exhausts its retries is recorded here so it can be redelivered
//! later instead of being lost. Postgres is the primary store; the JSONL log
//! is used when the service runs without a database.

use super::mailer::OutgoingEmail;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// A failed notification awaiting redelivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub id: i64,
    /// What kind of notification this was (e.g. "lead_notification")
    pub kind: String,
    pub email: OutgoingEmail,
    pub last_error: String,
    pub attempts: i32,
    /// The last failure was a permanent rejection; redelivery skips it
    #[serde(default)]
    pub permanent: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewDeadLetter {
    pub kind: String,
    pub email: OutgoingEmail,
    pub last_error: String,
    pub attempts: i32,
    pub permanent: bool,
}

#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn record(&self, letter: NewDeadLetter) -> anyhow::Result<i64>;

    /// Unresolved entries, oldest first.
    async fn pending(&self) -> anyhow::Result<Vec<DeadLetter>>;

    async fn mark_resolved(&self, id: i64) -> anyhow::Result<()>;

    /// Record one more failed redelivery attempt.
    async fn record_attempt(&self, id: i64, error: &str, permanent: bool) -> anyhow::Result<()>;
}

// ==================== JSONL file ====================

/// One JSON object per line. Attempts append a new version of the entry and
/// the last line for an id wins. Resolving an entry rewrites the file with
/// only the pending entries.
pub struct JsonlDeadLetterLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlDeadLetterLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest version of every entry, keyed (and so ordered) by id.
    async fn load(&self) -> anyhow::Result<BTreeMap<i64, DeadLetter>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut letters = BTreeMap::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DeadLetter>(line) {
                Ok(letter) => {
                    letters.insert(letter.id, letter);
                }
                Err(e) => warn!(
                    "Skipping corrupt dead-letter line {} in {}: {}",
                    line_no + 1,
                    self.path.display(),
                    e
                ),
            }
        }

        Ok(letters)
    }

    async fn append(&self, letter: &DeadLetter) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(letter)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Replace the log with `letters`, via a temporary file renamed into place.
    async fn rewrite(&self, letters: impl Iterator<Item = &DeadLetter>) -> anyhow::Result<()> {
        let mut contents = String::new();
        for letter in letters {
            contents.push_str(&serde_json::to_string(letter)?);
            contents.push('\n');
        }

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let mut file = NamedTempFile::new_in(&dir)
                .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
            file.write_all(contents.as_bytes())?;
            file.as_file().sync_all()?;
            file.persist(&path)
                .with_context(|| format!("Failed to replace {}", path.display()))?;
            Ok(())
        })
        .await?
    }
}

#[async_trait]
impl DeadLetterSink for JsonlDeadLetterLog {
    async fn record(&self, letter: NewDeadLetter) -> anyhow::Result<i64> {
        let _guard = self.lock.lock().await;
        let id = self.load().await?.keys().next_back().copied().unwrap_or(0) + 1;

        self.append(&DeadLetter {
            id,
            kind: letter.kind,
            email: letter.email,
            last_error: letter.last_error,
            attempts: letter.attempts,
            permanent: letter.permanent,
            created_at: Utc::now(),
            resolved_at: None,
        })
        .await?;

        Ok(id)
    }

    async fn pending(&self) -> anyhow::Result<Vec<DeadLetter>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .into_values()
            .filter(|l| l.resolved_at.is_none())
            .collect())
    }

    async fn mark_resolved(&self, id: i64) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut letters = self.load().await?;
        if letters.remove(&id).is_none() {
            bail!("Dead letter {} not found", id);
        }
        self.rewrite(letters.values().filter(|l| l.resolved_at.is_none()))
            .await
    }

    async fn record_attempt(&self, id: i64, error: &str, permanent: bool) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut letter = self
            .load()
            .await?
            .remove(&id)
            .ok_or_else(|| anyhow!("Dead letter {} not found", id))?;
        letter.attempts += 1;
        letter.last_error = error.to_string();
        letter.permanent = permanent;
        self.append(&letter).await
    }
}

// ==================== In-memory ====================

/// Process-local sink, used by tests.
#[derive(Default)]
pub struct MemoryDeadLetters {
    letters: StdMutex<Vec<DeadLetter>>,
}

impl MemoryDeadLetters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry, resolved or not.
    pub fn all(&self) -> Vec<DeadLetter> {
        self.letters.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn with_letter<F>(&self, id: i64, change: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut DeadLetter),
    {
        let mut letters = self
            .letters
            .lock()
            .map_err(|_| anyhow::anyhow!("dead-letter store poisoned"))?;
        let letter = letters
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| anyhow::anyhow!("Dead letter {} not found", id))?;
        change(letter);
        Ok(())
    }
}

#[async_trait]
impl DeadLetterSink for MemoryDeadLetters {
    async fn record(&self, letter: NewDeadLetter) -> anyhow::Result<i64> {
        let mut letters = self
            .letters
            .lock()
            .map_err(|_| anyhow::anyhow!("dead-letter store poisoned"))?;
        let id = letters.len() as i64 + 1;
        letters.push(DeadLetter {
            id,
            kind: letter.kind,
            email: letter.email,
            last_error: letter.last_error,
            attempts: letter.attempts,
            permanent: letter.permanent,
            created_at: Utc::now(),
            resolved_at: None,
        });
        Ok(id)
    }

    async fn pending(&self) -> anyhow::Result<Vec<DeadLetter>> {
        Ok(self
            .all()
            .into_iter()
            .filter(|l| l.resolved_at.is_none())
            .collect())
    }

    async fn mark_resolved(&self, id: i64) -> anyhow::Result<()> {
        self.with_letter(id, |l| l.resolved_at = Some(Utc::now()))
    }

    async fn record_attempt(&self, id: i64, error: &str, permanent: bool) -> anyhow::Result<()> {
        self.with_letter(id, |l| {
            l.attempts += 1;
            l.last_error = error.to_string();
            l.permanent = permanent;
        })
    }
}
