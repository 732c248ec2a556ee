//! Diagnostic events emitted by validation and repair.
//!
//! The engine reports what it found or changed through an injected
//! [`DiagnosticSink`]. [`NoopSink`] is the default; [`TracingSink`] forwards
//! events to `tracing`, and [`CollectingSink`] keeps them in memory.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{Message, MessageContent};

const PREVIEW_CHARS: usize = 50;

/// What produced a diagnostic event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiagnosticOperation {
    /// A synthetic message was inserted by repair.
    Insert,
    /// The validator flagged an adjacency.
    Violation,
}

/// A structured diagnostic record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub operation: DiagnosticOperation,
    pub index: usize,
    pub detail: String,
}

impl DiagnosticEvent {
    pub fn insert(index: usize, detail: impl Into<String>) -> Self {
        Self {
            operation: DiagnosticOperation::Insert,
            index,
            detail: detail.into(),
        }
    }

    pub fn violation(index: usize, detail: impl Into<String>) -> Self {
        Self {
            operation: DiagnosticOperation::Violation,
            index,
            detail: detail.into(),
        }
    }
}

/// Destination for diagnostic events. Must tolerate concurrent writers.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

impl<F> DiagnosticSink for F
where
    F: Fn(DiagnosticEvent) + Send + Sync,
{
    fn record(&self, event: DiagnosticEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Forwards events to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: DiagnosticEvent) {
        tracing::debug!(
            target: "roci_ordering",
            operation = %event.operation,
            index = event.index,
            detail = %event.detail,
            "message ordering"
        );
    }
}

/// Buffers events in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.lock().clone()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<DiagnosticEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DiagnosticEvent>> {
        // A panicking writer cannot leave a Vec half-pushed.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, event: DiagnosticEvent) {
        self.lock().push(event);
    }
}

/// One-line summary of a message: `[i] role=tool content='25'`.
pub fn describe_message(index: usize, message: &Message) -> String {
    // Mirrors the wire record: an explicit `tool_calls: []` is still flagged.
    let has_tool_calls = matches!(
        message,
        Message::Assistant {
            tool_calls: Some(_),
            ..
        }
    );
    let tool_info = if has_tool_calls {
        " [has_tool_calls]"
    } else {
        ""
    };
    let content_info = match message.content() {
        Some(MessageContent::Text(text)) if !text.is_empty() => {
            format!(" content='{}'", preview(text))
        }
        Some(MessageContent::Parts(parts)) if !parts.is_empty() => {
            format!(" content=<{} parts>", parts.len())
        }
        _ => " content=<empty>".to_string(),
    };
    format!("[{index}] role={}{tool_info}{content_info}", message.role())
}

/// Summaries for every message in a transcript.
pub fn describe_sequence(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| describe_message(index, message))
        .collect()
}

/// Log a transcript summary at debug level.
pub fn trace_sequence(prefix: &str, messages: &[Message]) {
    if !prefix.is_empty() {
        tracing::debug!(target: "roci_ordering", len = messages.len(), "{prefix}");
    }
    for line in describe_sequence(messages) {
        tracing::debug!(target: "roci_ordering", "  {line}");
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
