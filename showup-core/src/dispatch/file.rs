//! Pending reminders persisted as a JSON file.
//!
//! The CLI schedules into this store and `showup-notify` drains due
//! reminders from it, so the pending set survives process restarts.
//!
//! Both run as separate processes. Every read-modify-write cycle holds an
//! exclusive lock on a `pending.lock` file next to the store.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::dispatch::NotificationDispatcher;
use crate::error::DispatchError;
use crate::reminder::ScheduledReminder;

const PENDING_FILE: &str = "pending.json";
const LOCK_FILE: &str = "pending.lock";

type Pending = BTreeMap<String, ScheduledReminder>;

pub struct FileDispatcher {
    dir: PathBuf,
    path: PathBuf,
    // Tasks in this process queue here before contending for the file lock
    lock: Mutex<()>,
}

/// Exclusive access to the store; released on drop.
struct StoreLock<'a> {
    _file: File,
    _local: MutexGuard<'a, ()>,
}

impl FileDispatcher {
    /// Store pending reminders under `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        FileDispatcher {
            dir: data_dir.to_path_buf(),
            path: data_dir.join(PENDING_FILE),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn lock_store(&self) -> Result<StoreLock<'_>, DispatchError> {
        let local = self.lock.lock().await;

        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;

        // Held only for one load/save cycle, so the wait is short
        FileExt::lock_exclusive(&file)?;

        Ok(StoreLock {
            _file: file,
            _local: local,
        })
    }

    fn load(&self, _lock: &StoreLock<'_>) -> Result<Pending, DispatchError> {
        if !self.path.exists() {
            return Ok(Pending::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Pending::new());
        }

        serde_json::from_str(&content).map_err(|e| DispatchError::Serialization(e.to_string()))
    }

    fn save(&self, _lock: &StoreLock<'_>, pending: &Pending) -> Result<(), DispatchError> {
        let content = serde_json::to_string_pretty(pending)
            .map_err(|e| DispatchError::Serialization(e.to_string()))?;

        // Readers never see a partial store
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Remove and return every reminder due at or before `now`, earliest first.
    pub async fn take_due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledReminder>, DispatchError> {
        let lock = self.lock_store().await?;
        let mut pending = self.load(&lock)?;

        let due_ids: Vec<String> = pending
            .values()
            .filter(|r| r.fire_at <= now)
            .map(|r| r.id.clone())
            .collect();

        if due_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut due: Vec<ScheduledReminder> = due_ids
            .iter()
            .filter_map(|id| pending.remove(id))
            .collect();
        due.sort_by_key(|r| r.fire_at);

        self.save(&lock, &pending)?;
        Ok(due)
    }

    /// Earliest fire time among pending reminders.
    pub async fn next_fire_at(&self) -> Result<Option<DateTime<Utc>>, DispatchError> {
        let lock = self.lock_store().await?;
        Ok(self.load(&lock)?.values().map(|r| r.fire_at).min())
    }
}

#[async_trait]
impl NotificationDispatcher for FileDispatcher {
    async fn schedule(&self, reminder: ScheduledReminder) -> Result<(), DispatchError> {
        let lock = self.lock_store().await?;
        let mut pending = self.load(&lock)?;

        debug!(id = %reminder.id, fire_at = %reminder.fire_at, "Storing reminder");
        pending.insert(reminder.id.clone(), reminder);

        self.save(&lock, &pending)
    }

    async fn cancel(&self, ids: &[String]) {
        let lock = match self.lock_store().await {
            Ok(lock) => lock,
            Err(e) => {
                warn!(path = %self.path.display(), "Could not lock pending reminders: {}", e);
                return;
            }
        };

        let mut pending = match self.load(&lock) {
            Ok(pending) => pending,
            Err(e) => {
                warn!(path = %self.path.display(), "Could not read pending reminders: {}", e);
                return;
            }
        };

        let before = pending.len();
        for id in ids {
            pending.remove(id);
        }

        if pending.len() == before {
            return;
        }

        debug!(removed = before - pending.len(), "Cancelled reminders");
        if let Err(e) = self.save(&lock, &pending) {
            warn!(path = %self.path.display(), "Could not write pending reminders: {}", e);
        }
    }

    async fn pending(&self) -> Vec<ScheduledReminder> {
        let loaded = match self.lock_store().await {
            Ok(lock) => self.load(&lock),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(pending) => {
                let mut reminders: Vec<_> = pending.into_values().collect();
                reminders.sort_by_key(|r| r.fire_at);
                reminders
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Could not read pending reminders: {}", e);
                Vec::new()
            }
        }
    }
}
