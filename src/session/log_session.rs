//! A single open log file: its line buffer, search query, and follow flag.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::config::TailConfig;
use crate::tail::{ClassifiedLine, TailEvent, TailState, TailWatcher};

use super::types::{Badge, CategoryCounts, ChangeReason, SessionEvent, SessionId, ViewChange};
use super::view::ViewFilter;

/// Per-file session state.
///
/// The line buffer is append-only and its sequence numbers are gap-free from
/// 0. The session owns its [`TailWatcher`]; dropping or closing the session
/// tears the watcher down with it.
#[derive(Debug)]
pub struct LogSession {
    id: SessionId,
    /// Canonical path, used as the session's identity.
    path: PathBuf,
    display_name: String,
    follow_tail: bool,
    search_query: String,
    lines: Vec<ClassifiedLine>,
    filter: ViewFilter,
    watcher: TailWatcher,
}

impl LogSession {
    /// Open a session on `path`, reading its snapshot and arming the tail.
    ///
    /// Appended lines are delivered to `events` tagged with `id`; feed them
    /// back through [`apply`](Self::apply). An unreadable file produces an
    /// empty session that never grows.
    #[must_use]
    pub fn open(
        id: SessionId,
        path: PathBuf,
        tail: &TailConfig,
        follow_tail: bool,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let publish = move |event| events.send(SessionEvent { session: id, event }).is_ok();
        let (watcher, lines) = TailWatcher::open(path.clone(), tail, publish);
        let filter = ViewFilter::new("", &lines);

        tracing::info!(
            session = %id,
            path = %path.display(),
            lines = lines.len(),
            "Opened log session"
        );

        Self {
            id,
            display_name: display_name(&path),
            path,
            follow_tail,
            search_query: String::new(),
            lines,
            filter,
            watcher,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn follow_tail(&self) -> bool {
        self.follow_tail
    }

    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// The whole buffer, unfiltered.
    #[must_use]
    pub fn lines(&self) -> &[ClassifiedLine] {
        &self.lines
    }

    #[must_use]
    pub fn tail_state(&self) -> TailState {
        self.watcher.state()
    }

    /// Whether new lines can still arrive for this session.
    #[must_use]
    pub fn is_tailing(&self) -> bool {
        self.watcher.is_armed()
    }

    pub fn set_follow_tail(&mut self, follow: bool) -> ViewChange {
        self.follow_tail = follow;
        ViewChange::new(self.id, ChangeReason::FollowChanged { follow })
    }

    /// Replace the search query and recompute the view from scratch.
    pub fn set_search_query(&mut self, query: impl Into<String>) -> ViewChange {
        let before = self.filter.len();
        self.search_query = query.into();
        self.filter = ViewFilter::new(&self.search_query, &self.lines);

        tracing::debug!(
            session = %self.id,
            query = %self.search_query,
            visible = self.filter.len(),
            "Search query changed"
        );

        let scroll_to = if self.follow_tail && self.filter.len() > before {
            self.last_visible_sequence()
        } else {
            None
        };
        ViewChange::new(self.id, ChangeReason::QueryChanged).with_scroll(scroll_to)
    }

    /// Lines passing the current query, in buffer order.
    #[must_use]
    pub fn filtered_view(&self) -> Vec<&ClassifiedLine> {
        if self.filter.is_unfiltered() {
            return self.lines.iter().collect();
        }
        self.filter
            .indices()
            .iter()
            .map(|&index| &self.lines[index])
            .collect()
    }

    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filter.len()
    }

    /// Whether `line` passes the current query.
    #[must_use]
    pub fn is_visible(&self, line: &ClassifiedLine) -> bool {
        self.filter.matches(line)
    }

    /// Visible lines with a sequence number of at least `sequence`.
    pub fn visible_since(&self, sequence: u64) -> impl Iterator<Item = &ClassifiedLine> + '_ {
        let start = usize::try_from(sequence).unwrap_or(usize::MAX);
        self.lines
            .get(start..)
            .unwrap_or_default()
            .iter()
            .filter(|line| self.filter.matches(line))
    }

    /// Error/warning counts over the filtered view.
    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        self.filter.counts()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.counts().errors
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.counts().warnings
    }

    #[must_use]
    pub fn badge(&self) -> Badge {
        self.counts().badge()
    }

    /// Sequence of the last line in the filtered view.
    #[must_use]
    pub fn last_visible_sequence(&self) -> Option<u64> {
        self.filter
            .indices()
            .last()
            .map(|&index| self.lines[index].sequence)
    }

    /// Explicit request to jump to the end of the filtered view.
    #[must_use]
    pub fn scroll_to_end(&self) -> ViewChange {
        ViewChange::new(self.id, ChangeReason::ScrollRequested)
            .with_scroll(self.last_visible_sequence())
    }

    /// Apply an event published by this session's watcher.
    pub(crate) fn apply(&mut self, event: TailEvent) -> ViewChange {
        match event {
            TailEvent::Lines(batch) => self.append(batch),
            TailEvent::Truncated => {
                tracing::info!(session = %self.id, path = %self.path.display(), "Log file truncated");
                ViewChange::new(self.id, ChangeReason::Truncated)
            }
            TailEvent::Stopped => {
                tracing::info!(session = %self.id, path = %self.path.display(), "Log file no longer readable");
                ViewChange::new(self.id, ChangeReason::Stopped)
            }
        }
    }

    fn append(&mut self, batch: Vec<ClassifiedLine>) -> ViewChange {
        let start = self.lines.len();
        let count = batch.len();
        for mut line in batch {
            let expected = self.lines.len() as u64;
            if line.sequence != expected {
                tracing::warn!(
                    session = %self.id,
                    expected,
                    got = line.sequence,
                    "Renumbering out-of-order line"
                );
                line.sequence = expected;
            }
            self.lines.push(line);
        }
        let visible = self.filter.extend(&self.lines, start);

        let scroll_to = if self.follow_tail && visible > 0 {
            self.last_visible_sequence()
        } else {
            None
        };

        ViewChange::new(
            self.id,
            ChangeReason::LinesAppended {
                first_sequence: start as u64,
                count,
                visible,
            },
        )
        .with_scroll(scroll_to)
    }

    /// Stop tailing. Idempotent.
    pub fn close(&mut self) {
        self.watcher.close();
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
