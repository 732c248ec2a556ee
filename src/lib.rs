//! Roci Ordering — role-ordering validation and repair for chat transcripts.
//!
//! Strict backends reject transcripts where a `user` turn directly follows a
//! `tool` turn. This crate classifies backends, validates transcripts against
//! the ordering grammar, and repairs them by inserting empty assistant turns.
//!
//! # Quick Start
//!
//! ```
//! use roci_ordering::prelude::*;
//!
//! let messages = vec![
//!     Message::user("Calculate 5 squared"),
//!     Message::assistant_with_tool_calls("", vec![ToolCall::function("1", "calc", "{}")]),
//!     Message::tool("1", "25"),
//!     Message::user("Thanks!"),
//! ];
//!
//! if requires_strict_ordering("mistral-large-2512", None) {
//!     let fixed = repair(&messages);
//!     assert_eq!(fixed.len(), 5);
//!     assert!(validate(&fixed).is_empty());
//! }
//! ```

pub mod config;
pub mod error;
pub mod ordering;
pub mod prelude;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
