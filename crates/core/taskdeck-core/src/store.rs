//! Persisted background-task state
//!
//! A keyed collection of [`TaskRecord`]s updated via upsert-on-`task_id`
//! semantics. The store is the single source of truth: every mutation
//! rewrites the persisted collection and re-publishes a full snapshot to
//! subscribers.

use crate::storage::KvStore;
use crate::types::{TaskEvent, TaskRecord, TaskStatus};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Well-known persistence key for the task collection
pub const STORAGE_KEY: &str = "taskdeck-tasks";

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

fn now_ts() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Shared handle to the ordered collection of task records
///
/// Cloning shares the same underlying state. All mutation goes through the
/// upsert/delete/clear operations; records are never handed out mutably.
#[derive(Clone)]
pub struct TaskStore {
    records: Arc<RwLock<Vec<TaskRecord>>>,
    storage: Option<Arc<dyn KvStore>>,
    snapshots: broadcast::Sender<Vec<TaskRecord>>,
}

impl TaskStore {
    /// Create an empty, non-persisted store
    pub fn new() -> Self {
        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            storage: None,
            snapshots,
        }
    }

    /// Create a store backed by `storage`, loading any persisted collection
    ///
    /// An absent key loads as an empty collection. A persisted value that no
    /// longer parses is logged and discarded rather than failing startup.
    pub fn with_storage(storage: Arc<dyn KvStore>) -> Self {
        let records = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<TaskRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!("Discarding unreadable persisted tasks: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load persisted tasks: {}", e);
                Vec::new()
            }
        };

        let (snapshots, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            records: Arc::new(RwLock::new(records)),
            storage: Some(storage),
            snapshots,
        }
    }

    /// Apply a task event with upsert semantics keyed by `task_id`
    ///
    /// First observation of an id creates a record at the front of the
    /// ordered view, with `created_at`/`updated_at` taken from the event
    /// timestamp (receipt time when absent). Later events overwrite
    /// `status`/`progress`/`message`/`error` in place — absent optional
    /// fields clear the stored values — and set `updated_at` to the current
    /// time; `task_type`, `created_at`, and position never change.
    pub fn apply(&self, event: &TaskEvent) {
        {
            let mut records = self.records.write().unwrap();
            match records.iter_mut().find(|r| r.task_id == event.task_id) {
                Some(record) => {
                    record.status = event.status;
                    record.progress = event.progress;
                    record.message = event.message.clone();
                    record.error = event.error.clone();
                    record.updated_at = now_ts();
                }
                None => {
                    let observed_at = event.timestamp.unwrap_or_else(now_ts);
                    records.insert(
                        0,
                        TaskRecord {
                            task_id: event.task_id.clone(),
                            task_type: event.task_type.clone(),
                            status: event.status,
                            progress: event.progress,
                            message: event.message.clone(),
                            error: event.error.clone(),
                            created_at: observed_at,
                            updated_at: observed_at,
                        },
                    );
                }
            }
        }
        self.publish();
    }

    /// Remove the record matching `task_id`; no-op for unknown ids
    pub fn delete(&self, task_id: &str) -> bool {
        let removed = {
            let mut records = self.records.write().unwrap();
            let before = records.len();
            records.retain(|r| r.task_id != task_id);
            records.len() != before
        };
        if removed {
            self.publish();
        }
        removed
    }

    /// Remove every record with a terminal status, returning how many
    pub fn clear_terminal(&self) -> usize {
        let removed = {
            let mut records = self.records.write().unwrap();
            let before = records.len();
            records.retain(|r| !r.status.is_terminal());
            before - records.len()
        };
        self.publish();
        removed
    }

    /// Remove every record
    pub fn clear_all(&self) {
        self.records.write().unwrap().clear();
        self.publish();
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Number of records with the given status
    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.records
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.status == status)
            .count()
    }

    /// Record counts keyed by status name
    pub fn stats(&self) -> HashMap<String, usize> {
        let records = self.records.read().unwrap();
        let mut stats = HashMap::new();
        for record in records.iter() {
            *stats.entry(record.status.to_string()).or_insert(0) += 1;
        }
        stats
    }

    /// Clone of the current ordered collection, newest first
    pub fn snapshot(&self) -> Vec<TaskRecord> {
        self.records.read().unwrap().clone()
    }

    /// Subscribe to full-collection snapshots published after each mutation
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<TaskRecord>> {
        self.snapshots.subscribe()
    }

    /// Persist and broadcast the current collection
    ///
    /// Persistence failure is a non-fatal diagnostic; the in-memory
    /// collection stays authoritative for the session.
    fn publish(&self) {
        let snapshot = self.snapshot();

        if let Some(storage) = &self.storage {
            match serde_json::to_string(&snapshot) {
                Ok(raw) => {
                    if let Err(e) = storage.put(STORAGE_KEY, &raw) {
                        tracing::warn!("Failed to persist tasks: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to serialize tasks: {}", e),
            }
        }

        let _ = self.snapshots.send(snapshot);
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}
