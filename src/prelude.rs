//! Convenience re-exports for common use.

pub use crate::config::{OrderingConfig, OrderingMode};
pub use crate::error::{OrderingError, Result};
pub use crate::ordering::{
    prepare_messages, repair, requires_strict_ordering, validate, DiagnosticSink, NoopSink,
    OrderingPolicy, OrderingRule, PreparedMessages, TracingSink, Violation, ViolationKind,
};
pub use crate::types::{Message, MessageContent, Role, ToolCall};
