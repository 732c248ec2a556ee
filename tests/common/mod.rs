//! Shared transcript fixtures.

#![allow(dead_code)]

use roci_ordering::types::{Message, Role, ToolCall};

pub fn calc_call(id: &str) -> ToolCall {
    ToolCall::function(id, "calc", r#"{"x": 5}"#)
}

/// Build a minimal message for a role; assistants carry a tool call when `calls` is set.
pub fn message(role: Role, calls: bool, seq: usize) -> Message {
    match role {
        Role::System => Message::system(format!("system {seq}")),
        Role::User => Message::user(format!("user {seq}")),
        Role::Assistant if calls => Message::assistant_with_tool_calls(
            format!("calling {seq}"),
            vec![calc_call(&seq.to_string())],
        ),
        Role::Assistant => Message::assistant(format!("assistant {seq}")),
        Role::Tool => Message::tool(seq.to_string(), format!("result {seq}")),
    }
}

/// Every transcript up to `max_len` turns over the five message shapes.
pub fn all_transcripts(max_len: usize) -> Vec<Vec<Message>> {
    const SHAPES: [(Role, bool); 5] = [
        (Role::System, false),
        (Role::User, false),
        (Role::Assistant, false),
        (Role::Assistant, true),
        (Role::Tool, false),
    ];

    let mut out = vec![Vec::new()];
    let mut frontier: Vec<Vec<Message>> = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for (role, calls) in SHAPES {
                let mut transcript = prefix.clone();
                transcript.push(message(role, calls, prefix.len()));
                next.push(transcript);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

/// Number of maximal tool runs immediately followed by a user turn.
pub fn tool_runs_before_user(messages: &[Message]) -> usize {
    messages
        .windows(2)
        .filter(|pair| pair[0].role() == Role::Tool && pair[1].role() == Role::User)
        .count()
}

pub fn roles(messages: &[Message]) -> Vec<Role> {
    messages.iter().map(Message::role).collect()
}

/// The real-world case that triggered Mistral error 3230.
pub fn calculator_transcript() -> Vec<Message> {
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
