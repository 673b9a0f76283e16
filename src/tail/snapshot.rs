//! One-shot read of a file's existing contents.

use std::borrow::Cow;
use std::path::Path;

use super::error::TailError;
use super::line::{ClassifiedLine, LineSplitter};

/// Lines read at open time plus the byte offset the tail should resume from.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub lines: Vec<ClassifiedLine>,
    pub offset: u64,
}

impl Snapshot {
    /// Read the whole file and classify its non-empty lines.
    ///
    /// Sequence numbers start at 0 in file order. Lines that are not valid
    /// UTF-8 are skipped, but the offset still moves past them so the tail
    /// only picks up later appends. An incomplete multi-byte sequence at the
    /// very end is left unread for the tail to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn read(path: &Path, splitter: &mut LineSplitter) -> Result<Self, TailError> {
        let bytes = std::fs::read(path).map_err(|e| TailError::from_open(e, path))?;

        let decoded = decode_lines(&bytes);
        if decoded.skipped > 0 {
            tracing::warn!(
                path = %path.display(),
                skipped = decoded.skipped,
                "Skipping lines that are not valid UTF-8"
            );
        }

        let lines = splitter
            .push(&decoded.text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| ClassifiedLine::new(index as u64, text))
            .collect::<Vec<_>>();

        tracing::debug!(
            path = %path.display(),
            lines = lines.len(),
            offset = decoded.consumed,
            "Read initial snapshot"
        );

        Ok(Self {
            lines,
            offset: decoded.consumed as u64,
        })
    }
}

/// Read every non-empty line of `path`, classified.
///
/// Unreadable files produce an empty sequence.
#[must_use]
pub fn read_all(path: &Path) -> Vec<ClassifiedLine> {
    match Snapshot::read(path, &mut LineSplitter::new(false)) {
        Ok(snapshot) => snapshot.lines,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Snapshot read failed");
            Vec::new()
        }
    }
}

/// Text decoded from a raw chunk of the file.
#[derive(Debug)]
pub(crate) struct Decoded<'a> {
    pub(crate) text: Cow<'a, str>,
    /// Bytes covered, excluding an incomplete trailing character.
    pub(crate) consumed: usize,
    /// Lines dropped because they were not valid UTF-8.
    pub(crate) skipped: usize,
}

/// Decode a chunk line by line, dropping only the lines that are not UTF-8.
///
/// A dropped line still leaves its newline behind so a held partial
/// fragment is not joined with the following line. An invalid unterminated
/// fragment at the end is consumed and dropped.
pub(crate) fn decode_lines(bytes: &[u8]) -> Decoded<'_> {
    if let Some((text, consumed)) = decode_utf8(bytes) {
        return Decoded {
            text: Cow::Borrowed(text),
            consumed,
            skipped: 0,
        };
    }

    let complete = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |index| index + 1);
    let mut text = String::with_capacity(bytes.len());
    let mut skipped = 0;

    for line in bytes[..complete].split_inclusive(|&b| b == b'\n') {
        if let Ok(valid) = std::str::from_utf8(line) {
            text.push_str(valid);
        } else {
            skipped += 1;
            text.push('\n');
        }
    }

    let consumed = match decode_utf8(&bytes[complete..]) {
        Some((rest, used)) => {
            text.push_str(rest);
            complete + used
        }
        None => {
            skipped += 1;
            bytes.len()
        }
    };

    Decoded {
        text: Cow::Owned(text),
        consumed,
        skipped,
    }
}

/// Decode the longest valid UTF-8 prefix.
///
/// Returns the text and how many bytes it covers. Only an incomplete
/// sequence at the very end is tolerated; any other invalid byte yields
/// `None`.
fn decode_utf8(bytes: &[u8]) -> Option<(&str, usize)> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Some((text, bytes.len())),
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            std::str::from_utf8(&bytes[..valid]).ok().map(|text| (text, valid))
        }
        Err(_) => None,
    }
}
