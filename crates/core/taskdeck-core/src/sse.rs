//! SSE stream decoding
//!
//! Splits a `text/event-stream`-like byte stream into discrete JSON events,
//! one per complete `data: <json>` line. This layer has no knowledge of task
//! semantics; see [`crate::router`] for classification.

use crate::{Result, TaskdeckError};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;

/// Line prefix that carries an event payload
pub const DATA_PREFIX: &str = "data: ";

/// Incremental decoder for `data: <json>` framed byte streams
///
/// Carry-over buffering is byte-level, so lines and UTF-8 sequences split at
/// arbitrary chunk boundaries decode identically to a single-chunk read.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Create a decoder with an empty carry-over buffer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed one chunk, returning the events parsed from complete lines
    ///
    /// The fragment after the last newline stays buffered until a later
    /// chunk completes it. A fragment still buffered at end-of-stream was
    /// never a complete line and is never emitted.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Value> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].iter().position(|&b| b == b'\n') {
            let end = consumed + offset;
            if let Some(event) = parse_line(&self.buffer[consumed..end]) {
                events.push(event);
            }
            consumed = end + 1;
        }
        self.buffer.drain(..consumed);
        events
    }
}

/// Parse one complete line, returning the payload of a valid `data:` line
///
/// Lines without the prefix are ignored. A payload that is not valid JSON is
/// a non-fatal diagnostic: log and skip, the stream keeps going.
fn parse_line(line: &[u8]) -> Option<Value> {
    let text = String::from_utf8_lossy(line);
    let payload = text.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to parse SSE payload: {} ({})", e, payload);
            None
        }
    }
}

/// Drive a byte stream through a decoder to completion
///
/// Calls `on_event` synchronously for every decoded event, in line order.
/// Resolves `Ok(())` at end-of-stream; a source read error is fatal to the
/// decode and surfaces as [`TaskdeckError::Stream`].
pub async fn decode_stream<S, E, F>(mut stream: S, mut on_event: F) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
    F: FnMut(Value),
{
    let mut decoder = SseDecoder::new();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| TaskdeckError::stream(format!("stream read failed: {}", e)))?;
        for event in decoder.feed(&chunk) {
            on_event(event);
        }
    }
    Ok(())
}
