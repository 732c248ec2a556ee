//! Ordering validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Message, Role};

use super::diagnostics::{DiagnosticEvent, DiagnosticSink, NoopSink};
use super::grammar::{check_adjacency, ViolationKind};

/// An illegal adjacency found in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    /// Zero-based index of the offending (second) message.
    pub index: usize,
    pub role: Role,
    pub previous_role: Role,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid message sequence at index {}: {}",
            self.index, self.message
        )
    }
}

/// Scan a transcript for ordering violations, in transcript order.
pub fn validate(messages: &[Message]) -> Vec<Violation> {
    validate_with_sink(messages, &NoopSink)
}

/// Like [`validate`], also emitting one `violation` event per finding.
pub fn validate_with_sink(messages: &[Message], sink: &dyn DiagnosticSink) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (index, pair) in messages.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        let Some(kind) = check_adjacency(previous, current) else {
            continue;
        };
        let violation = Violation {
            index: index + 1,
            role: current.role(),
            previous_role: previous.role(),
            kind,
            message: kind.describe(current.role()),
        };
        sink.record(DiagnosticEvent::violation(
            violation.index,
            violation.message.clone(),
        ));
        violations.push(violation);
    }

    violations
}

/// Whether a transcript satisfies the ordering grammar.
pub fn is_valid(messages: &[Message]) -> bool {
    messages
        .windows(2)
        .all(|pair| check_adjacency(&pair[0], &pair[1]).is_none())
}
