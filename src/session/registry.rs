//! Registry of open log sessions.

use std::ops::Add;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;

use crate::config::{SessionConfig, TailConfig, ViewerConfig};

use super::intent::Intent;
use super::log_session::LogSession;
use super::types::{CategoryCounts, ChangeReason, SessionEvent, SessionId, ViewChange};

/// Ordered set of open sessions, at most one per file.
///
/// Order is tab order. All tail events from every session funnel through
/// one channel owned by the registry, so sessions are only mutated by
/// whoever drives [`next_change`](Self::next_change) or [`pump`](Self::pump).
/// Events for a session that has been closed are discarded.
#[derive(Debug)]
pub struct SessionRegistry {
    tail: TailConfig,
    defaults: SessionConfig,
    sessions: Vec<LogSession>,
    selected: Option<SessionId>,
    previous: Option<SessionId>,
    next_id: u64,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Create an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TailConfig::default(), SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(tail: TailConfig, defaults: SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            tail,
            defaults,
            sessions: Vec::new(),
            selected: None,
            previous: None,
            next_id: 0,
            events_tx,
            events_rx,
        }
    }

    #[must_use]
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::with_config(config.tail.clone(), config.session.clone())
    }

    /// Open `path`, or return the session already open for it.
    ///
    /// A new session is appended and selected. Opening never fails; a
    /// missing or unreadable file yields an empty session.
    pub fn open(&mut self, path: impl AsRef<Path>) -> SessionId {
        self.open_inner(path.as_ref()).0
    }

    fn open_inner(&mut self, path: &Path) -> (SessionId, Vec<ViewChange>) {
        let key = session_key(path);
        if let Some(existing) = self.find_by_key(&key) {
            tracing::debug!(session = %existing, path = %key.display(), "File already open");
            return (existing, Vec::new());
        }

        let id = SessionId::new(self.next_id);
        self.next_id += 1;

        let session = LogSession::open(
            id,
            key,
            &self.tail,
            self.defaults.follow_tail,
            self.events_tx.clone(),
        );
        self.sessions.push(session);

        let mut changes = vec![ViewChange::new(id, ChangeReason::Opened)];
        changes.extend(self.select(id));
        (id, changes)
    }

    /// Close a session and stop its tail. Unknown ids are ignored.
    ///
    /// If the closed session was selected, the session now at the same
    /// position is selected, else the new last one, else nothing.
    pub fn close(&mut self, id: SessionId) -> bool {
        self.close_inner(id).is_some()
    }

    fn close_inner(&mut self, id: SessionId) -> Option<Vec<ViewChange>> {
        let Some(index) = self.position(id) else {
            tracing::debug!(session = %id, "Close of unknown session ignored");
            return None;
        };

        let mut session = self.sessions.remove(index);
        session.close();
        tracing::info!(session = %id, path = %session.path().display(), "Closed log session");

        let mut changes = vec![ViewChange::new(id, ChangeReason::Closed)];

        if self.previous == Some(id) {
            self.previous = None;
        }
        if self.selected == Some(id) {
            self.selected = None;
            self.previous = None;
            let next = self
                .sessions
                .get(index)
                .or_else(|| self.sessions.last())
                .map(LogSession::id);
            if let Some(next) = next {
                changes.extend(self.select(next));
            }
        }

        Some(changes)
    }

    /// Make `id` the active session, remembering the prior one.
    ///
    /// Returns `None` if `id` is unknown or already selected.
    pub fn select(&mut self, id: SessionId) -> Option<ViewChange> {
        if self.selected == Some(id) {
            return None;
        }
        let scroll_to = self.get(id)?.last_visible_sequence();

        let previous = self.selected.replace(id);
        self.previous = previous;
        tracing::debug!(session = %id, previous = ?previous, "Selected session");

        Some(ViewChange::new(id, ChangeReason::Selected { previous }).with_scroll(scroll_to))
    }

    /// Apply a UI intent, returning the resulting view changes.
    pub fn dispatch(&mut self, intent: Intent) -> Vec<ViewChange> {
        match intent {
            Intent::Open(paths) => paths
                .iter()
                .flat_map(|path| self.open_inner(path).1)
                .collect(),
            Intent::Select(id) => self.select(id).into_iter().collect(),
            Intent::Close(id) => self.close_inner(id).unwrap_or_default(),
            Intent::CloseActive => {
                let Some(id) = self.selected else {
                    return Vec::new();
                };
                self.close_inner(id).unwrap_or_default()
            }
            Intent::SetSearchQuery { session, query } => self
                .get_mut(session)
                .map(|s| s.set_search_query(query))
                .into_iter()
                .collect(),
            Intent::ClearActiveSearch => self
                .selected_session_mut()
                .map(|s| s.set_search_query(String::new()))
                .into_iter()
                .collect(),
            Intent::SetFollowTail { session, follow } => self
                .get_mut(session)
                .map(|s| s.set_follow_tail(follow))
                .into_iter()
                .collect(),
            Intent::ScrollToEnd(id) => self.get(id).map(LogSession::scroll_to_end).into_iter().collect(),
            Intent::FocusSearch => self
                .selected
                .map(|id| ViewChange::new(id, ChangeReason::FocusSearch))
                .into_iter()
                .collect(),
        }
    }

    /// Wait for the next tail event and apply it to its session.
    pub async fn next_change(&mut self) -> ViewChange {
        loop {
            // The registry holds a sender, so the channel never closes.
            let Some(event) = self.events_rx.recv().await else {
                return std::future::pending().await;
            };
            if let Some(change) = self.route(event) {
                return change;
            }
        }
    }

    /// Apply every tail event already queued, without waiting.
    pub fn pump(&mut self) -> Vec<ViewChange> {
        let mut changes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            changes.extend(self.route(event));
        }
        changes
    }

    fn route(&mut self, event: SessionEvent) -> Option<ViewChange> {
        let SessionEvent { session, event } = event;
        if let Some(target) = self.get_mut(session) {
            Some(target.apply(event))
        } else {
            tracing::trace!(session = %session, "Dropping event for closed session");
            None
        }
    }

    /// Sessions in tab order.
    #[must_use]
    pub fn sessions(&self) -> &[LogSession] {
        &self.sessions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<&LogSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut LogSession> {
        self.sessions.iter_mut().find(|s| s.id() == id)
    }

    /// Tab position of a session.
    #[must_use]
    pub fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id() == id)
    }

    /// Find the session open for `path`, if any.
    #[must_use]
    pub fn find_by_path(&self, path: impl AsRef<Path>) -> Option<SessionId> {
        self.find_by_key(&session_key(path.as_ref()))
    }

    fn find_by_key(&self, key: &Path) -> Option<SessionId> {
        self.sessions
            .iter()
            .find(|s| s.path() == key)
            .map(LogSession::id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<SessionId> {
        self.selected
    }

    /// The session that was active before the current one.
    #[must_use]
    pub fn previous(&self) -> Option<SessionId> {
        self.previous
    }

    #[must_use]
    pub fn selected_session(&self) -> Option<&LogSession> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_session_mut(&mut self) -> Option<&mut LogSession> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Error/warning counts summed over every session's filtered view.
    #[must_use]
    pub fn totals(&self) -> CategoryCounts {
        self.sessions
            .iter()
            .map(LogSession::counts)
            .fold(CategoryCounts::default(), Add::add)
    }
}

/// Identity of a file: its canonical path, or an absolute form when it
/// cannot be resolved (e.g. it does not exist).
fn session_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}
