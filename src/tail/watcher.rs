//! Per-file tail watcher with notify integration.
//!
//! Reads the file's snapshot synchronously, then watches it for appends and
//! publishes newly classified lines.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::EventKind;
use notify_debouncer_full::{
    new_debouncer, notify::RecursiveMode, DebounceEventResult, DebouncedEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::error::TailError;
use super::line::ClassifiedLine;
use super::tailer::LogTailer;
use crate::config::TailConfig;

/// Events published by a tail watcher, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailEvent {
    /// Newly appended lines.
    Lines(Vec<ClassifiedLine>),
    /// The file shrank and is being re-read from the start.
    Truncated,
    /// The file went away or became unreadable; nothing more will follow.
    Stopped,
}

/// Observable state of a [`TailWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    /// Snapshot taken; waiting for appends. An unarmed watcher (missing
    /// file, failed watch) also reports this and simply never publishes.
    Watching,
    /// The file disappeared or became unreadable after opening.
    Stopped,
    /// [`TailWatcher::close`] was called.
    Closed,
}

/// Watches one file for appended lines.
///
/// Events go to the `publish` callback given at open time. Once the callback
/// reports its receiver is gone, or the watcher is closed, nothing more is
/// published.
pub struct TailWatcher {
    /// The file being tailed.
    path: PathBuf,
    cancel: CancellationToken,
    /// Background task reading on notifications; `None` when unarmed.
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl std::fmt::Debug for TailWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TailWatcher")
            .field("path", &self.path)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl TailWatcher {
    /// Open `path`, read its current contents, and start watching it.
    ///
    /// Returns the watcher and the snapshot lines (sequence 0 onward). A
    /// file that cannot be read yields an empty snapshot and an unarmed
    /// watcher. Failing to arm the watch is logged and otherwise behaves
    /// like a file that never grows.
    ///
    /// Arming needs a Tokio runtime; without one the watcher stays unarmed.
    pub fn open<F>(path: PathBuf, config: &TailConfig, publish: F) -> (Self, Vec<ClassifiedLine>)
    where
        F: FnMut(TailEvent) -> bool + Send + 'static,
    {
        let mut tailer = LogTailer::new(path.clone(), config.hold_partial_lines);
        let cancel = CancellationToken::new();

        let snapshot = match tailer.read_snapshot() {
            Ok(lines) => lines,
            Err(e) => {
                tracing::debug!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read file, leaving tail unarmed"
                );
                let watcher = Self {
                    path,
                    cancel,
                    task: None,
                    closed: false,
                };
                return (watcher, Vec::new());
            }
        };

        let task = match Self::arm(tailer, config, cancel.clone(), publish) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to arm file watch");
                None
            }
        };

        tracing::debug!(
            path = %path.display(),
            lines = snapshot.len(),
            armed = task.is_some(),
            "Tail watcher opened"
        );

        (
            Self {
                path,
                cancel,
                task,
                closed: false,
            },
            snapshot,
        )
    }

    /// Start the notify debouncer and the task that reads on its events.
    fn arm<F>(
        tailer: LogTailer,
        config: &TailConfig,
        cancel: CancellationToken,
        publish: F,
    ) -> Result<JoinHandle<()>, TailError>
    where
        F: FnMut(TailEvent) -> bool + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| TailError::RuntimeUnavailable(tailer.path().to_path_buf()))?;

        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let mut debouncer = new_debouncer(config.debounce(), None, move |result: DebounceEventResult| {
            let _ = notify_tx.send(result);
        })?;

        // Watch the parent directory so rotation (remove + create) is seen.
        let watch_target = watch_target(tailer.path());
        debouncer.watch(&watch_target, RecursiveMode::NonRecursive)?;

        let file_name = tailer.path().file_name().map(OsString::from);
        let ticker = config.poll_interval().map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        Ok(runtime.spawn(async move {
            // Keep the debouncer alive for as long as the task runs.
            let _debouncer = debouncer;
            run_watch(tailer, file_name, notify_rx, ticker, cancel, publish).await;
        }))
    }

    /// Stop watching. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::debug!(path = %self.path.display(), "Tail watcher closed");
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TailState {
        if self.closed {
            return TailState::Closed;
        }
        match &self.task {
            Some(task) if task.is_finished() => TailState::Stopped,
            _ => TailState::Watching,
        }
    }

    /// Whether a filesystem watch is actually running.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Get the path being tailed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TailWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn watch_target(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

/// Whether any debounced event touches the tailed file.
fn touches_file(events: &[DebouncedEvent], file_name: Option<&OsString>) -> bool {
    events.iter().any(|event| {
        let relevant_kind = matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        );
        relevant_kind
            && event
                .paths
                .iter()
                .any(|p| file_name.map_or(true, |name| p.file_name() == Some(name.as_os_str())))
    })
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_watch<F>(
    mut tailer: LogTailer,
    file_name: Option<OsString>,
    mut notify_rx: mpsc::UnboundedReceiver<DebounceEventResult>,
    mut ticker: Option<Interval>,
    cancel: CancellationToken,
    mut publish: F,
) where
    F: FnMut(TailEvent) -> bool + Send + 'static,
{
    loop {
        let should_read = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = notify_rx.recv() => match result {
                Some(Ok(events)) => touches_file(&events, file_name.as_ref()),
                Some(Err(errors)) => {
                    for error in errors {
                        tracing::warn!(path = %tailer.path().display(), error = %error, "File watcher error");
                    }
                    false
                }
                None => break,
            },
            () = next_tick(&mut ticker) => true,
        };

        if !should_read {
            continue;
        }

        let read = tailer.read_appended().await;
        if cancel.is_cancelled() {
            break;
        }

        match read {
            Ok(read) => {
                if read.truncated && !publish(TailEvent::Truncated) {
                    break;
                }
                if !read.lines.is_empty() {
                    tracing::trace!(
                        path = %tailer.path().display(),
                        lines = read.lines.len(),
                        "Publishing appended lines"
                    );
                    if !publish(TailEvent::Lines(read.lines)) {
                        break;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(
                    path = %tailer.path().display(),
                    error = %e,
                    "Tailed file unavailable, stopping"
                );
                let _ = publish(TailEvent::Stopped);
                break;
            }
        }
    }
}
