//! Session identifiers and change notifications.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::tail::{Category, TailEvent};

/// Identity of an open session. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// A tail event tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: TailEvent,
}

/// Why a session's view may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// A new session was added to the registry.
    Opened,
    /// Lines were appended to the buffer.
    LinesAppended {
        /// Sequence of the first appended line.
        first_sequence: u64,
        /// Number of lines appended.
        count: usize,
        /// How many of them pass the current filter.
        visible: usize,
    },
    QueryChanged,
    FollowChanged { follow: bool },
    /// The session became the active one.
    Selected { previous: Option<SessionId> },
    /// The consumer asked to jump to the end.
    ScrollRequested,
    /// The file shrank and is being re-read from the start.
    Truncated,
    /// The file is gone; no more lines will arrive.
    Stopped,
    Closed,
    /// The consumer should focus the search field.
    FocusSearch,
}

/// Notification that a session's view may need re-rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewChange {
    pub session: SessionId,
    pub reason: ChangeReason,
    /// Sequence of the line to anchor to, when the view should jump to its
    /// end.
    pub scroll_to: Option<u64>,
}

impl ViewChange {
    #[must_use]
    pub fn new(session: SessionId, reason: ChangeReason) -> Self {
        Self {
            session,
            reason,
            scroll_to: None,
        }
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll_to: Option<u64>) -> Self {
        self.scroll_to = scroll_to;
        self
    }
}

/// Error and warning counts over a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub errors: usize,
    pub warnings: usize,
}

impl CategoryCounts {
    pub fn record(&mut self, category: Category) {
        match category {
            Category::Error => self.errors += 1,
            Category::Warning => self.warnings += 1,
            Category::Info | Category::Other => {}
        }
    }

    /// Badge to show for these counts. Errors take precedence.
    #[must_use]
    pub fn badge(self) -> Badge {
        if self.errors > 0 {
            Badge::Errors(self.errors)
        } else if self.warnings > 0 {
            Badge::Warnings(self.warnings)
        } else {
            Badge::None
        }
    }
}

impl Add for CategoryCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            errors: self.errors + other.errors,
            warnings: self.warnings + other.warnings,
        }
    }
}

/// Count badge shown next to a session's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    None,
    Errors(usize),
    Warnings(usize),
}
