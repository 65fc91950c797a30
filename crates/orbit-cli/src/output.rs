//! Rendering for command results and errors.
//!
//! Handlers build a typed result and hand it here with the resolved
//! [`OutputMode`]. Results go to stdout, errors to stderr, so `--json`
//! output stays parseable even when tracing is verbose.
//!
//! The mode comes from `--format` when given, otherwise from configuration
//! (`--json`, `ORBIT_FORMAT`, the user file, then TTY detection).

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use orbit_core::error::StoreError;
use serde::Serialize;
use std::io::{self, Write};

const RULE_WIDTH: usize = 72;
const KEY_WIDTH: usize = 12;

pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

/// One `key: value` line with keys padded to a common column.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let label = format!("{key}:");
    writeln!(w, "{label:<KEY_WIDTH$} {}", value.as_ref())
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sectioned output for a person at a terminal.
    Pretty,
    /// One line per record, for agents and pipes.
    Text,
    /// Pretty-printed JSON: an object per item, an array per list.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// `--format` beats whatever configuration resolved to.
pub fn resolve_output_mode(flag: Option<OutputMode>, configured: &str) -> OutputMode {
    flag.unwrap_or(match configured {
        "json" => OutputMode::Json,
        "pretty" => OutputMode::Pretty,
        _ => OutputMode::Text,
    })
}

/// A result type that knows its pretty and text forms. JSON comes from
/// `Serialize`.
pub trait Renderable: Serialize {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Single text row, columns in [`Renderable::table_headers`] order.
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

fn write_json(w: &mut dyn Write, value: &impl Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

fn write_item<R: Renderable>(w: &mut dyn Write, item: &R, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Pretty => item.render_human(w)?,
        OutputMode::Text => item.render_table(w)?,
        OutputMode::Json => write_json(w, item)?,
    }
    Ok(())
}

fn write_list<R: Renderable>(
    w: &mut dyn Write,
    items: &[R],
    mode: OutputMode,
    empty: &str,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => return write_json(w, &items),
        OutputMode::Pretty if items.is_empty() => writeln!(w, "{empty}")?,
        OutputMode::Text if !items.is_empty() && !R::table_headers().is_empty() => {
            writeln!(w, "{}", R::table_headers().join("  "))?;
        }
        OutputMode::Pretty | OutputMode::Text => {}
    }
    for item in items {
        write_item(w, item, mode)?;
    }
    Ok(())
}

pub fn render_item<R: Renderable>(item: &R, mode: OutputMode) -> anyhow::Result<()> {
    write_item(&mut io::stdout().lock(), item, mode)
}

/// Print a list; text mode prefixes a header row, an empty pretty list prints
/// `empty` instead.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode, empty: &str) -> anyhow::Result<()> {
    write_list(&mut io::stdout().lock(), items, mode, empty)
}

/// Acknowledge a command that has no record to show.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if mode.is_json() {
        write_json(&mut out, &serde_json::json!({ "ok": true, "message": message }))
    } else {
        writeln!(out, "✓ {message}")?;
        Ok(())
    }
}

/// What the user sees when a command fails.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####` code from [`orbit_core::ErrorCode`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(str::to_string),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode.is_json() {
        return write_json(w, &serde_json::json!({ "error": error }));
    }
    let tag = error
        .error_code
        .as_deref()
        .map_or_else(|| "error".to_string(), |code| format!("error[{code}]"));
    writeln!(w, "{tag}: {}", error.message)?;
    if let Some(suggestion) = &error.suggestion {
        writeln!(w, "  hint: {suggestion}")?;
    }
    Ok(())
}

pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(&mut io::stderr().lock(), mode, error)
}
