// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use ghostwrite_common::types::{Notice, Severity};
use ghostwrite_engine::events::EditorEvent;
use ghostwrite_engine::session::EditorError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per line).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

/// Write a value to a provided writer (useful for testing).
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    match format {
        OutputFormat::Human => {
            let line =
                render_human_stderr_line("error", message, io::stderr().is_terminal(), ANSI_RED);
            let _ = writeln!(err, "{line}");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": {
                    "code": code,
                    "message": message,
                }
            });
            let _ = serde_json::to_writer(&mut err, &obj);
            let _ = writeln!(err);
        }
    }
}

/// Print a mapped, actionable error for a command failure.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    let (code, message) = actionable_error(error);
    print_error(format, code, &message);
}

fn actionable_error(error: &anyhow::Error) -> (&'static str, String) {
    let editor_error = error.chain().find_map(|cause| cause.downcast_ref::<EditorError>());
    match editor_error {
        Some(EditorError::NotFound(id)) => (
            "DOCUMENT_NOT_FOUND",
            format!("Document {id} not found. Run: ghostwrite ls to see available documents"),
        ),
        Some(EditorError::IdentityRequired) => (
            "IDENTITY_REQUIRED",
            "No display name set. Run: ghostwrite whoami --set <name>".to_string(),
        ),
        Some(EditorError::EmptyName | EditorError::NameTooLong) => {
            ("INVALID_NAME", format!("{error:#}"))
        }
        Some(EditorError::Store(_)) => ("STORAGE_ERROR", format!("{error:#}")),
        Some(EditorError::NoOpenDocument) | None => {
            let message = format!("{error:#}");
            if message.contains("failed to open document database") {
                ("DATABASE_UNAVAILABLE", message)
            } else {
                ("ERROR", message)
            }
        }
    }
}

fn render_human_stderr_line(label: &str, message: &str, is_tty: bool, color: &str) -> String {
    if is_tty {
        format!("{color}{label}:{ANSI_RESET} {message}")
    } else {
        format!("{label}: {message}")
    }
}

/// One line of human-readable text per editor event.
pub fn render_event(event: &EditorEvent) -> String {
    match event {
        EditorEvent::Notice(Notice { message, severity }) => {
            let label = match severity {
                Severity::Info => "info",
                Severity::Success => "ok",
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            format!("[{label}] {message}")
        }
        EditorEvent::TypingStarted { name, .. } => format!("{name} is typing…"),
        EditorEvent::TypingStopped { name, .. } => format!("{name} stopped typing"),
        EditorEvent::RosterChanged { online, .. } => {
            let names: Vec<_> = online.iter().map(|u| u.name.as_str()).collect();
            if names.is_empty() {
                "online: nobody".to_string()
            } else {
                format!("online: {}", names.join(", "))
            }
        }
        EditorEvent::ContentChanged { stats, .. } => {
            format!("content changed ({} words, {} characters)", stats.words, stats.characters)
        }
        EditorEvent::Saved { version, at, .. } => {
            format!("saved v{version} at {}", at.format("%H:%M:%S"))
        }
        EditorEvent::DocumentsChanged => "document list changed".to_string(),
    }
}

/// Write editor events, one per line.
pub fn write_events<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    events: &[EditorEvent],
) -> io::Result<()> {
    for event in events {
        write_output(writer, format, event, render_event)?;
    }
    Ok(())
}
