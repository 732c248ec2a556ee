//! CLI for checking and repairing transcript files.

use std::io::{Read, Write};
use std::path::Path;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::config::OrderingConfig;
use crate::error::{OrderingError, Result};
use crate::ordering::{prepare_messages, repair_with_report, validate, DiagnosticSink};
use crate::types::Message;

/// Roci ordering CLI
#[derive(Parser, Debug)]
#[command(
    name = "roci-ordering",
    version,
    about = "Validate and repair role ordering in chat transcripts"
)]
pub struct Cli {
    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report ordering violations; exits non-zero when any are found
    Check(CheckArgs),
    /// Print the transcript with ordering repaired
    Repair(RepairArgs),
    /// Report whether a backend needs strict ordering
    Classify(ClassifyArgs),
}

/// Arguments for `roci-ordering check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Transcript JSON file, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,

    /// Model id the transcript is sent to; labels the report strict or lenient
    #[arg(short, long)]
    pub model: Option<String>,

    /// Provider serving the model
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// Arguments for `roci-ordering repair`.
#[derive(Parser, Debug)]
pub struct RepairArgs {
    /// Transcript JSON file, or `-` for stdin
    #[arg(default_value = "-")]
    pub input: String,

    /// Model id the transcript is sent to
    #[arg(short, long)]
    pub model: Option<String>,

    /// Provider serving the model
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Repair even when the backend is not strict
    #[arg(long)]
    pub force: bool,

    /// Pretty-print the output JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for `roci-ordering classify`.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Model id
    pub model: String,

    /// Provider serving the model
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// A bare message array or a chat request body with a `messages` field.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptInput {
    Messages(Vec<Message>),
    Request { messages: Vec<Message> },
}

/// Parse a transcript from JSON text.
pub fn parse_transcript(raw: &str) -> Result<Vec<Message>> {
    let input: TranscriptInput = serde_json::from_str(raw)?;
    Ok(match input {
        TranscriptInput::Messages(messages) | TranscriptInput::Request { messages } => messages,
    })
}

/// Read a transcript from a file, or stdin when `input` is `-`.
pub fn read_transcript(input: &str) -> Result<Vec<Message>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(Path::new(input))?
    };
    parse_transcript(&raw)
}

/// Print violations. Returns `true` when the transcript is clean.
pub fn handle_check(
    messages: &[Message],
    args: &CheckArgs,
    config: &OrderingConfig,
    out: &mut impl Write,
) -> Result<bool> {
    if let Some(model) = args.model.as_deref() {
        let strict = config.requires_strict_ordering(model, args.provider.as_deref());
        let verdict = if strict { "strict" } else { "lenient" };
        writeln!(out, "{model}: {verdict}")?;
    }
    let violations = validate(messages);
    if violations.is_empty() {
        writeln!(out, "ok: {} messages, no ordering violations", messages.len())?;
        return Ok(true);
    }
    for violation in &violations {
        let fix = if violation.kind.is_repairable() {
            "repairable"
        } else {
            "not repairable"
        };
        writeln!(out, "{violation} [{fix}]")?;
    }
    Ok(false)
}

/// Print the repaired transcript as JSON.
pub fn handle_repair(
    messages: &[Message],
    args: &RepairArgs,
    config: &OrderingConfig,
    sink: &dyn DiagnosticSink,
    out: &mut impl Write,
) -> Result<()> {
    let repaired = if args.force {
        repair_with_report(messages, sink).messages
    } else {
        let model = args.model.as_deref().ok_or_else(|| {
            OrderingError::InvalidArgument("--model is required unless --force is given".into())
        })?;
        prepare_messages(messages, model, args.provider.as_deref(), config, sink).messages
    };

    if args.pretty {
        serde_json::to_writer_pretty(&mut *out, &repaired)?;
    } else {
        serde_json::to_writer(&mut *out, &repaired)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Print `strict` or `lenient` for a backend.
pub fn handle_classify(
    args: &ClassifyArgs,
    config: &OrderingConfig,
    out: &mut impl Write,
) -> Result<bool> {
    let strict = config.requires_strict_ordering(&args.model, args.provider.as_deref());
    writeln!(out, "{}", if strict { "strict" } else { "lenient" })?;
    Ok(strict)
}
