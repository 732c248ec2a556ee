//! The role-adjacency grammar shared by validation and repair.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::types::{Message, Role};

/// Class of an illegal adjacency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViolationKind {
    /// A `user` turn directly after a `tool` turn.
    UserAfterTool,
    /// Anything other than `tool` directly after an assistant turn with tool calls.
    PendingToolCalls,
}

impl ViolationKind {
    /// Whether repair can fix this class by inserting an empty assistant turn.
    ///
    /// Pending tool calls are never repaired: the only fix would be a fabricated
    /// tool result.
    pub fn is_repairable(self) -> bool {
        matches!(self, Self::UserAfterTool)
    }

    /// Human-readable description, given the offending role.
    pub fn describe(self, role: Role) -> String {
        match self {
            Self::UserAfterTool => "`user` cannot follow `tool`; an `assistant` turn is required \
                 between them."
                .to_string(),
            Self::PendingToolCalls => format!(
                "`{role}` cannot follow an `assistant` turn with pending tool calls; a `tool` \
                 turn is expected."
            ),
        }
    }
}

/// Check one adjacent pair. `None` means the pair is legal.
///
/// tool→tool, tool→assistant and tool→system are all legal.
pub(crate) fn check_adjacency(previous: &Message, current: &Message) -> Option<ViolationKind> {
    match (previous.role(), current.role()) {
        (Role::Tool, Role::User) => Some(ViolationKind::UserAfterTool),
        (Role::Assistant, role) if previous.has_pending_tool_calls() && role != Role::Tool => {
            Some(ViolationKind::PendingToolCalls)
        }
        _ => None,
    }
}
