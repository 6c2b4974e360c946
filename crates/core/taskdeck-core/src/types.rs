//! Task event and record types

use serde::{Deserialize, Serialize};

/// Type-tag prefix that marks a stream event as a task-progress event
pub const TASK_EVENT_PREFIX: &str = "TASK_";

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is queued but not yet started
    Pending,
    /// Task is currently running
    Running,
    /// Task completed successfully
    Completed,
    /// Task failed with an error
    Failed,
}

impl TaskStatus {
    /// Whether no further progress is expected for this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// Wire-level task-progress event
///
/// Carried on `data:` lines whose `type` starts with [`TASK_EVENT_PREFIX`]
/// (e.g. `TASK_UPDATE`). Optional fields are absent values, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// Type tag (`TASK_CREATED`, `TASK_UPDATE`, ...)
    #[serde(rename = "type")]
    pub event_type: String,
    /// Stable identifier of the logical task
    pub task_id: String,
    /// Human-facing category label (tool or action name)
    pub task_type: String,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Progress percentage. Passed through verbatim from upstream; values
    /// outside 0-100 are not clamped.
    pub progress: i64,
    /// Human-readable status text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Human-readable error text, meaningful when `status` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Epoch seconds; falls back to receipt time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// Store-level task record, one per distinct `task_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Stable identifier of the logical task
    pub task_id: String,
    /// Category label, fixed at first observation
    pub task_type: String,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Progress percentage, verbatim from the latest event
    pub progress: i64,
    /// Status text from the latest event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error text from the latest event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Epoch seconds, set once at first observation
    pub created_at: f64,
    /// Epoch seconds of the most recently applied event
    pub updated_at: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&TaskStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");

        let status: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, TaskStatus::Failed);
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TaskStatus::Pending.to_string(), "pending");
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn test_event_optional_fields_absent() {
        let event: TaskEvent = serde_json::from_str(
            r#"{"type":"TASK_UPDATE","task_id":"t1","task_type":"crawl","status":"running","progress":40}"#,
        )
        .unwrap();

        assert_eq!(event.event_type, "TASK_UPDATE");
        assert_eq!(event.task_id, "t1");
        assert_eq!(event.progress, 40);
        assert!(event.message.is_none());
        assert!(event.error.is_none());
        assert!(event.timestamp.is_none());
    }

    #[test]
    fn test_event_missing_required_field_is_error() {
        let result = serde_json::from_str::<TaskEvent>(
            r#"{"type":"TASK_UPDATE","task_type":"crawl","status":"running","progress":40}"#,
        );
        assert!(result.is_err());
    }
}
