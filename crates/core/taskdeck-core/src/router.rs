//! Stream event classification and fan-out
//!
//! Every decoded event is delivered to the generic sinks; events whose type
//! tag starts with [`TASK_EVENT_PREFIX`] are additionally deserialized and
//! delivered to the task sinks. Classification is additive, not exclusive.

use crate::types::{TaskEvent, TASK_EVENT_PREFIX};
use serde_json::Value;

/// Sink receiving every decoded event
pub type GenericSink = Box<dyn FnMut(&Value) + Send>;

/// Sink receiving classified task-progress events
pub type TaskSink = Box<dyn FnMut(&TaskEvent) + Send>;

/// Routes decoded stream events to registered sinks
///
/// Subscriptions are an explicit observer list; delivery is fire-and-forget
/// and synchronous, in registration order. With no task sink registered a
/// task event is simply dropped.
#[derive(Default)]
pub struct EventRouter {
    generic_sinks: Vec<GenericSink>,
    task_sinks: Vec<TaskSink>,
}

impl EventRouter {
    /// Create a router with no sinks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink for every decoded event
    pub fn add_generic_sink(&mut self, sink: impl FnMut(&Value) + Send + 'static) {
        self.generic_sinks.push(Box::new(sink));
    }

    /// Register a sink for task-progress events
    pub fn add_task_sink(&mut self, sink: impl FnMut(&TaskEvent) + Send + 'static) {
        self.task_sinks.push(Box::new(sink));
    }

    /// Deliver one decoded event
    ///
    /// Generic sinks fire for every event regardless of classification. A
    /// `TASK_*`-typed value that does not deserialize into [`TaskEvent`] is
    /// logged and dropped; field defaulting beyond that is the store's job.
    pub fn route(&mut self, event: &Value) {
        for sink in &mut self.generic_sinks {
            sink(event);
        }

        let is_task = event
            .get("type")
            .and_then(Value::as_str)
            .map(|t| t.starts_with(TASK_EVENT_PREFIX))
            .unwrap_or(false);
        if !is_task {
            return;
        }

        match serde_json::from_value::<TaskEvent>(event.clone()) {
            Ok(task_event) => {
                for sink in &mut self.task_sinks {
                    sink(&task_event);
                }
            }
            Err(e) => tracing::warn!("Dropping malformed task event: {}", e),
        }
    }
}
