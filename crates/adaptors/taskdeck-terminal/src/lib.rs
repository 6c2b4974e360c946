//! Terminal task panel for Taskdeck
//!
//! A read-only view over the task store: subscribes to snapshot broadcasts
//! and reprints the panel after every mutation. Mutations themselves come in
//! through the shell's commands, not through this adaptor.

use chrono::TimeZone;
use taskdeck_core::{Result, TaskRecord, TaskStatus, TaskStore};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Panel configuration
#[derive(Clone, Default)]
pub struct PanelConfig {
    /// Whether the panel re-renders on store updates
    pub enabled: bool,
}

/// Live view of the background-task collection
pub struct TaskPanel {
    /// Panel configuration
    pub config: PanelConfig,
    /// Store handle the panel observes
    pub store: TaskStore,
}

impl TaskPanel {
    /// Create a panel over `store`
    pub fn new(config: PanelConfig, store: TaskStore) -> Self {
        Self { config, store }
    }

    /// Start re-rendering on every store publish
    pub async fn start(&self) -> Result<Option<JoinHandle<()>>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let mut snapshots = self.store.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match snapshots.recv().await {
                    Ok(snapshot) => println!("{}", render_panel(&snapshot)),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!("Task panel lagged, skipped {} snapshots", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Ok(Some(handle))
    }
}

/// Render the whole panel: counts header plus one block per record
pub fn render_panel(records: &[TaskRecord]) -> String {
    if records.is_empty() {
        return "── tasks ──\nno background tasks".to_string();
    }

    let completed = count(records, TaskStatus::Completed);
    let running = count(records, TaskStatus::Running);
    let failed = count(records, TaskStatus::Failed);

    let mut header = format!(
        "── tasks ── total: {} · completed: {} · running: {}",
        records.len(),
        completed,
        running
    );
    if failed > 0 {
        header.push_str(&format!(" · failed: {}", failed));
    }

    let mut out = vec![header];
    out.extend(records.iter().map(render_record));
    out.join("\n")
}

/// Render one task record
pub fn render_record(record: &TaskRecord) -> String {
    let mut lines = vec![format!(
        "[{}] {} — {}%",
        record.status, record.task_type, record.progress
    )];
    if let Some(message) = &record.message {
        lines.push(format!("    {}", message));
    }
    if record.status == TaskStatus::Failed {
        if let Some(error) = &record.error {
            lines.push(format!("    error: {}", error));
        }
    }
    lines.push(format!(
        "    started {}  ({})",
        format_ts(record.created_at),
        record.task_id
    ));
    lines.join("\n")
}

fn count(records: &[TaskRecord], status: TaskStatus) -> usize {
    records.iter().filter(|r| r.status == status).count()
}

fn format_ts(epoch_secs: f64) -> String {
    chrono::Local
        .timestamp_opt(epoch_secs as i64, 0)
        .single()
        .map(|dt| dt.format("%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "?".to_string())
}
