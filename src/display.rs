//! Terminal rendering of sessions and their lines.
//!
//! Formatting functions return strings. The `write_*` functions write them
//! to any writer and flush, returning I/O errors such as a closed pipe.

use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::session::{Badge, CategoryCounts, LogSession};
use crate::tail::{Category, ClassifiedLine};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Bracketed category tag, e.g. `[ERROR]`.
#[must_use]
pub fn category_tag(category: Category, color: bool) -> String {
    let tag = format!("[{}]", category.label());
    if !color {
        return tag;
    }
    match category {
        Category::Error => tag.red().bold().to_string(),
        Category::Warning => tag.yellow().bold().to_string(),
        Category::Info => tag.blue().bold().to_string(),
        Category::Other => tag.dimmed().to_string(),
    }
}

/// Count badge text, empty when there is nothing to report.
#[must_use]
pub fn format_badge(badge: Badge, color: bool) -> String {
    let (text, is_error) = match badge {
        Badge::None => return String::new(),
        Badge::Errors(1) => ("1 error".to_string(), true),
        Badge::Errors(n) => (format!("{n} errors"), true),
        Badge::Warnings(1) => ("1 warning".to_string(), false),
        Badge::Warnings(n) => (format!("{n} warnings"), false),
    };
    let text = format!("({text})");
    match (color, is_error) {
        (false, _) => text,
        (true, true) => text.red().to_string(),
        (true, false) => text.yellow().to_string(),
    }
}

/// A single line with its category tag.
#[must_use]
pub fn format_line(line: &ClassifiedLine, config: &DisplayConfig) -> String {
    let tag = category_tag(line.category, config.color);
    let text = if config.color && line.category == Category::Error {
        line.text.red().to_string()
    } else {
        line.text.clone()
    };
    if config.timestamps {
        let ts = timestamp();
        let ts = if config.color {
            ts.dimmed().to_string()
        } else {
            ts
        };
        format!("{ts} {tag} {text}")
    } else {
        format!("{tag} {text}")
    }
}

/// Header naming a session, its badge and active query.
#[must_use]
pub fn format_header(session: &LogSession, config: &DisplayConfig) -> String {
    let name = if config.color {
        session.display_name().cyan().bold().to_string()
    } else {
        session.display_name().to_string()
    };
    let mut header = format!("==> {name}");

    let badge = format_badge(session.badge(), config.color);
    if !badge.is_empty() {
        header.push(' ');
        header.push_str(&badge);
    }
    if !session.search_query().trim().is_empty() {
        header.push_str(&format!(
            " [filter: {:?}, {}/{} lines]",
            session.search_query(),
            session.filtered_len(),
            session.lines().len()
        ));
    }
    header.push_str(" <==");
    header
}

/// One line of machine-readable output.
#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    sequence: u64,
    category: Category,
    text: &'a str,
    source: &'a Path,
}

/// Serialize a line as a single JSON object tagged with its source file.
///
/// # Errors
///
/// Returns an error if the path cannot be represented as JSON.
pub fn json_line(line: &ClassifiedLine, source: &Path) -> serde_json::Result<String> {
    serde_json::to_string(&JsonLine {
        sequence: line.sequence,
        category: line.category,
        text: &line.text,
        source,
    })
}

/// Write a line, as text or JSON.
///
/// # Errors
///
/// Returns an error if writing to `out` fails, e.g. a closed pipe.
pub fn write_line<W: Write>(
    out: &mut W,
    line: &ClassifiedLine,
    source: &Path,
    config: &DisplayConfig,
    json: bool,
) -> io::Result<()> {
    if json {
        match json_line(line, source) {
            Ok(encoded) => writeln!(out, "{encoded}")?,
            Err(e) => tracing::warn!(error = %e, "Failed to encode line as JSON"),
        }
    } else {
        writeln!(out, "{}", format_line(line, config))?;
    }
    out.flush()
}

/// Write a session's header followed by its filtered view.
///
/// These lines were already in the file, so they are never timestamped.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_session<W: Write>(
    out: &mut W,
    session: &LogSession,
    config: &DisplayConfig,
    json: bool,
) -> io::Result<()> {
    let existing = DisplayConfig {
        timestamps: false,
        ..config.clone()
    };
    if !json {
        writeln!(out, "{}", format_header(session, &existing))?;
    }
    for line in session.filtered_view() {
        write_line(out, line, session.path(), &existing, json)?;
    }
    out.flush()
}

/// Write a notice about a session, such as truncation.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_notice<W: Write>(
    out: &mut W,
    session: &LogSession,
    message: &str,
    config: &DisplayConfig,
) -> io::Result<()> {
    let tag = if config.color {
        "[NOTICE]".magenta().bold().to_string()
    } else {
        "[NOTICE]".to_string()
    };
    writeln!(out, "{tag} {}: {message}", session.display_name())?;
    out.flush()
}

/// Summary of counts across all sessions.
#[must_use]
pub fn format_totals(sessions: usize, counts: CategoryCounts, color: bool) -> String {
    let errors = format!("{} errors", counts.errors);
    let warnings = format!("{} warnings", counts.warnings);
    let (errors, warnings) = if color {
        (errors.red().to_string(), warnings.yellow().to_string())
    } else {
        (errors, warnings)
    };
    format!("{sessions} files, {errors}, {warnings}")
}

/// Print an error message.
pub fn print_error(message: &str, color: bool) {
    if color {
        eprintln!("{} {}", "[ERROR]".red().bold(), message);
    } else {
        eprintln!("[ERROR] {message}");
    }
}
