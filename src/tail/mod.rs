//! Log tailing and line classification.
//!
//! A [`TailWatcher`] reads a file's snapshot once, then publishes classified
//! lines as bytes are appended.

mod classify;
mod error;
mod line;
mod snapshot;
mod tailer;
mod watcher;

pub use classify::{classify, Category};
pub use error::TailError;
pub use line::{ClassifiedLine, LineSplitter};
pub use snapshot::{read_all, Snapshot};
pub use tailer::{LogTailer, TailRead};
pub use watcher::{TailEvent, TailState, TailWatcher};
