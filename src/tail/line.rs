//! Classified lines and the newline splitter shared by the snapshot and tail paths.

use serde::{Deserialize, Serialize};

use super::classify::{classify, Category};

/// A single displayable line.
///
/// `sequence` is the line's position within its session and serves as a
/// stable identity for anchoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub sequence: u64,
    pub category: Category,
    pub text: String,
}

impl ClassifiedLine {
    /// Create a line, deriving its category from the text.
    #[must_use]
    pub fn new(sequence: u64, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            sequence,
            category: classify(&text),
            text,
        }
    }

    /// Case-insensitive substring match against an already lowercased needle.
    #[must_use]
    pub fn contains_lowered(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
    }
}

/// Splits decoded text into lines.
///
/// Empty lines are dropped on every path, and a trailing `\r` is stripped.
/// With `hold_partial` set, an unterminated final fragment is kept back and
/// joined with the next chunk; otherwise it is emitted as its own line.
#[derive(Debug, Default)]
pub struct LineSplitter {
    hold_partial: bool,
    pending: String,
}

impl LineSplitter {
    #[must_use]
    pub fn new(hold_partial: bool) -> Self {
        Self {
            hold_partial,
            pending: String::new(),
        }
    }

    /// Split a chunk, returning the lines it completes.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        let mut text = std::mem::take(&mut self.pending);
        text.push_str(chunk);

        let mut fragments: Vec<&str> = text.split('\n').collect();
        if self.hold_partial && !text.ends_with('\n') {
            if let Some(last) = fragments.pop() {
                self.pending = last.to_string();
            }
        }

        fragments
            .into_iter()
            .map(|fragment| fragment.strip_suffix('\r').unwrap_or(fragment))
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Text held back waiting for its newline.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Discard any held-back fragment.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
