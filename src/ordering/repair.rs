//! Ordering repair.
//!
//! Every `tool` turn that is directly followed by a `user` turn gets an empty
//! `assistant` turn inserted after it. Nothing is removed or reordered, and
//! assistant turns with unanswered tool calls are left as they are.

use std::borrow::Cow;

use crate::types::Message;

use super::diagnostics::{DiagnosticEvent, DiagnosticSink, NoopSink};
use super::grammar::{check_adjacency, ViolationKind};

/// A repaired transcript plus the positions of the synthetic turns.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOutcome {
    pub messages: Vec<Message>,
    /// Output indices of the inserted assistant turns, ascending.
    pub inserted_at: Vec<usize>,
}

impl RepairOutcome {
    pub fn insertions(&self) -> usize {
        self.inserted_at.len()
    }

    pub fn is_unchanged(&self) -> bool {
        self.inserted_at.is_empty()
    }
}

/// Repair a transcript, returning an owned copy.
pub fn repair(messages: &[Message]) -> Vec<Message> {
    repair_with_sink(messages, &NoopSink)
}

/// Repair a transcript, reporting each insertion to `sink`.
pub fn repair_with_sink(messages: &[Message], sink: &dyn DiagnosticSink) -> Vec<Message> {
    repair_borrowed(messages, sink)
        .into_iter()
        .map(Cow::into_owned)
        .collect()
}

/// Repair a transcript and report where synthetic turns landed.
pub fn repair_with_report(messages: &[Message], sink: &dyn DiagnosticSink) -> RepairOutcome {
    let repaired = repair_borrowed(messages, sink);
    let inserted_at = repaired
        .iter()
        .enumerate()
        .filter_map(|(index, message)| matches!(message, Cow::Owned(_)).then_some(index))
        .collect();
    RepairOutcome {
        messages: repaired.into_iter().map(Cow::into_owned).collect(),
        inserted_at,
    }
}

/// Repair a transcript without copying the original messages.
///
/// Original turns come back as `Cow::Borrowed`; synthetic turns are the only
/// `Cow::Owned` entries.
pub fn repair_borrowed<'a>(
    messages: &'a [Message],
    sink: &dyn DiagnosticSink,
) -> Vec<Cow<'a, Message>> {
    let mut out: Vec<Cow<'a, Message>> = Vec::with_capacity(messages.len());

    for (index, message) in messages.iter().enumerate() {
        out.push(Cow::Borrowed(message));

        let Some(next) = messages.get(index + 1) else {
            continue;
        };
        if check_adjacency(message, next) != Some(ViolationKind::UserAfterTool) {
            continue;
        }

        out.push(Cow::Owned(Message::synthetic_assistant()));
        sink.record(DiagnosticEvent::insert(
            index,
            format!(
                "inserted empty `assistant` turn after `{}` at index {index} (before `{}` at \
                 index {})",
                message.role(),
                next.role(),
                index + 1
            ),
        ));
    }

    out
}
