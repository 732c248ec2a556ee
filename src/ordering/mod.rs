//! Role-ordering enforcement for strict backends.
//!
//! Some backends (Mistral, and Mistral deployments behind watsonx) reject a
//! `user` turn that directly follows a `tool` turn. That shape is common after
//! converting transcripts that embed tool results inside user turns into the
//! standalone tool-turn format. This module decides which backends are strict,
//! finds illegal adjacencies, and inserts empty assistant turns where that is
//! enough to fix them.

pub mod classifier;
pub mod diagnostics;
pub mod grammar;
pub mod repair;
pub mod validate;

pub use classifier::{requires_strict_ordering, OrderingPolicy, OrderingRule};
pub use diagnostics::{
    describe_message, describe_sequence, trace_sequence, CollectingSink, DiagnosticEvent,
    DiagnosticOperation, DiagnosticSink, NoopSink, TracingSink,
};
pub use grammar::ViolationKind;
pub use repair::{repair, repair_borrowed, repair_with_report, repair_with_sink, RepairOutcome};
pub use validate::{is_valid, validate, validate_with_sink, Violation};

use crate::config::OrderingConfig;
use crate::types::Message;

/// Transcript ready for payload serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMessages {
    pub messages: Vec<Message>,
    /// Whether the backend was classified as strict.
    pub strict: bool,
    /// Output indices of synthetic assistant turns.
    pub inserted_at: Vec<usize>,
    /// Violations that survived repair. Always empty for lenient backends.
    pub residual: Vec<Violation>,
}

impl PreparedMessages {
    /// True when the backend will accept the transcript's ordering.
    pub fn is_clean(&self) -> bool {
        self.residual.is_empty()
    }
}

/// Classify the backend and repair the transcript if it is strict.
///
/// Lenient backends get the transcript back unchanged. For strict backends the
/// repaired transcript is validated again, and anything left (assistant turns
/// with unanswered tool calls) is returned in `residual` for the caller to
/// reject or forward.
pub fn prepare_messages(
    messages: &[Message],
    model_id: &str,
    provider_id: Option<&str>,
    config: &OrderingConfig,
    sink: &dyn DiagnosticSink,
) -> PreparedMessages {
    let strict = config.requires_strict_ordering(model_id, provider_id);
    if !strict {
        return PreparedMessages {
            messages: messages.to_vec(),
            strict,
            inserted_at: Vec::new(),
            residual: Vec::new(),
        };
    }

    if config.log_sequences() {
        trace_sequence("transcript before ordering repair", messages);
    }

    let outcome = repair_with_report(messages, sink);
    let residual = validate_with_sink(&outcome.messages, sink);

    if config.log_sequences() {
        trace_sequence("transcript after ordering repair", &outcome.messages);
    }
    if !outcome.is_unchanged() {
        tracing::debug!(
            model = model_id,
            provider = provider_id.unwrap_or("-"),
            inserted = outcome.insertions(),
            "repaired message ordering"
        );
    }
    if !residual.is_empty() {
        tracing::warn!(
            model = model_id,
            provider = provider_id.unwrap_or("-"),
            violations = residual.len(),
            first = %residual[0],
            "message ordering violations remain after repair"
        );
    }

    PreparedMessages {
        messages: outcome.messages,
        strict,
        inserted_at: outcome.inserted_at,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrderingMode;
    use crate::types::{Role, ToolCall};

    fn tool_then_user() -> Vec<Message> {
        vec![
            Message::user("Use the calculator to compute 5 squared"),
            Message::assistant_with_tool_calls(
                "I'll use the calculator tool",
                vec![ToolCall::function(
                    "toolu_1",
                    "calculator",
                    r#"{"operation": "square", "x": 5}"#,
                )],
            ),
            Message::tool("toolu_1", "25"),
            Message::user("What's the result?"),
        ]
    }

    #[test]
    fn strict_backend_gets_repaired_transcript() {
        let prepared = prepare_messages(
            &tool_then_user(),
            "mistral-large-2512",
            None,
            &OrderingConfig::new(),
            &NoopSink,
        );

        assert!(prepared.strict);
        assert_eq!(prepared.messages.len(), 5);
        assert_eq!(prepared.inserted_at, vec![3]);
        assert_eq!(prepared.messages[3].role(), Role::Assistant);
        assert!(prepared.is_clean());
    }

    #[test]
    fn lenient_backend_gets_transcript_unchanged() {
        let messages = tool_then_user();
        let prepared =
            prepare_messages(&messages, "gpt-4", None, &OrderingConfig::new(), &NoopSink);

        assert!(!prepared.strict);
        assert_eq!(prepared.messages, messages);
        assert!(prepared.inserted_at.is_empty());
    }

    #[test]
    fn never_mode_skips_repair_for_strict_models() {
        let config = OrderingConfig::new().with_mode(OrderingMode::Never);
        let messages = tool_then_user();
        let prepared = prepare_messages(&messages, "mistral-large", None, &config, &NoopSink);
        assert_eq!(prepared.messages, messages);
    }

    #[test]
    fn unrepairable_violations_are_reported_as_residual() {
        let messages = vec![
            Message::user("Calculate"),
            Message::assistant_with_tool_calls("", vec![ToolCall::function("1", "calc", "{}")]),
            Message::user("Never mind"),
        ];
        let sink = CollectingSink::new();
        let prepared = prepare_messages(
            &messages,
            "watsonx/mistral-large",
            Some("watsonx"),
            &OrderingConfig::new().with_log_sequences(true),
            &sink,
        );

        assert!(!prepared.is_clean());
        assert_eq!(prepared.residual[0].kind, ViolationKind::PendingToolCalls);
        assert_eq!(prepared.messages, messages);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].operation, DiagnosticOperation::Violation);
    }
}
