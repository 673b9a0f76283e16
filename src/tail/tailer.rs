//! Incremental log file tailer.
//!
//! Reads lines appended to a file since the last read.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::error::TailError;
use super::line::{ClassifiedLine, LineSplitter};
use super::snapshot::{decode_lines, Snapshot};

/// Outcome of one incremental read.
#[derive(Debug, Default)]
pub struct TailRead {
    /// Newly completed lines, in file order.
    pub lines: Vec<ClassifiedLine>,
    /// The file shrank below the cursor and was re-read from the start.
    pub truncated: bool,
}

/// Incremental file reader that tracks its read position and the next
/// sequence number to hand out.
#[derive(Debug)]
pub struct LogTailer {
    /// Path to the log file.
    path: PathBuf,
    /// Current byte offset in the file.
    offset: u64,
    /// Sequence number of the next line produced.
    next_sequence: u64,
    splitter: LineSplitter,
}

impl LogTailer {
    /// Create a tailer positioned at the beginning of the file.
    #[must_use]
    pub fn new(path: PathBuf, hold_partial: bool) -> Self {
        Self {
            path,
            offset: 0,
            next_sequence: 0,
            splitter: LineSplitter::new(hold_partial),
        }
    }

    /// Get the current byte offset.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Sequence number the next produced line will carry.
    #[must_use]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Get the path being tailed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file's existing contents and move the cursor past them.
    ///
    /// Meant to be called once, before any [`read_appended`](Self::read_appended).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read. The cursor is
    /// left untouched in that case.
    pub fn read_snapshot(&mut self) -> Result<Vec<ClassifiedLine>, TailError> {
        let snapshot = Snapshot::read(&self.path, &mut self.splitter)?;
        self.offset = snapshot.offset;
        self.next_sequence = snapshot.lines.len() as u64;
        Ok(snapshot.lines)
    }

    /// Read lines appended since the last read.
    ///
    /// If the file is truncated (smaller than our offset), the offset is
    /// reset to 0 and the new content is read from the beginning. Lines
    /// that are not valid UTF-8 are skipped with a warning; the rest of the
    /// chunk is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened (file deleted, permission denied)
    /// - I/O errors occur during reading
    pub async fn read_appended(&mut self) -> Result<TailRead, TailError> {
        let mut file = File::open(&self.path)
            .await
            .map_err(|e| TailError::from_open(e, &self.path))?;

        let file_len = file.metadata().await?.len();
        let mut read = TailRead::default();

        if file_len < self.offset {
            tracing::warn!(
                path = %self.path.display(),
                old_offset = self.offset,
                new_len = file_len,
                "File truncated, resetting offset to 0"
            );
            self.offset = 0;
            self.splitter.reset();
            read.truncated = true;
        }

        if file_len == self.offset {
            return Ok(read);
        }

        file.seek(std::io::SeekFrom::Start(self.offset)).await?;
        let mut bytes = Vec::with_capacity(usize::try_from(file_len - self.offset).unwrap_or(0));
        file.read_to_end(&mut bytes).await?;

        let decoded = decode_lines(&bytes);
        if decoded.skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                offset = self.offset,
                skipped = decoded.skipped,
                "Skipping appended lines that are not valid UTF-8"
            );
        }
        self.offset += decoded.consumed as u64;

        for text in self.splitter.push(&decoded.text) {
            read.lines.push(ClassifiedLine::new(self.next_sequence, text));
            self.next_sequence += 1;
        }

        Ok(read)
    }
}
