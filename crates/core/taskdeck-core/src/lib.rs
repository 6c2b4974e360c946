//! Taskdeck Core
//!
//! This crate provides the core of the Taskdeck chat shell: decoding an
//! SSE-framed agent response stream into discrete JSON events, classifying
//! task-progress events, and maintaining a persisted, ordered collection of
//! background task records. It includes:
//!
//! - Incremental SSE stream decoding with partial-line buffering
//! - Event routing with additive `TASK_*` classification
//! - An upsert-based task store with per-status counts and subscriptions
//! - A whole-value key-value persistence contract with a file-backed impl
//!
//! # Example: decoding a stream into the store
//!
//! ```no_run
//! use taskdeck_core::*;
//! use futures_util::stream;
//! use bytes::Bytes;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = TaskStore::new();
//!     let mut router = EventRouter::new();
//!     let sink = store.clone();
//!     router.add_task_sink(move |event| sink.apply(event));
//!
//!     let body = stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(
//!         b"data: {\"type\":\"TASK_UPDATE\",\"task_id\":\"t1\",\"task_type\":\"crawl\",\"status\":\"running\",\"progress\":40}\n",
//!     ))]);
//!     decode_stream(body, |event| router.route(&event)).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod error;
pub mod logger;
pub mod router;
pub mod sse;
pub mod storage;
pub mod store;
pub mod types;

// Re-export main types
pub use config::{get_env_bool, get_env_int, get_env_or, get_required_env, load_env};
pub use error::{Result, TaskdeckError};
pub use logger::init_logging;
pub use router::EventRouter;
pub use sse::{decode_stream, SseDecoder, DATA_PREFIX};
pub use storage::{FileKvStore, KvStore, MemoryKvStore};
pub use store::{TaskStore, STORAGE_KEY};
pub use types::{TaskEvent, TaskRecord, TaskStatus, TASK_EVENT_PREFIX};
