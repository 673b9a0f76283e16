//! User intents forwarded from the UI into the registry.

use std::path::PathBuf;

use super::types::SessionId;

/// An action requested by the UI or a keyboard shortcut.
///
/// Dispatched with [`SessionRegistry::dispatch`](super::SessionRegistry::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open each path, skipping ones already open.
    Open(Vec<PathBuf>),
    Select(SessionId),
    Close(SessionId),
    /// Close whichever session is selected.
    CloseActive,
    SetSearchQuery { session: SessionId, query: String },
    /// Clear the selected session's search query.
    ClearActiveSearch,
    SetFollowTail { session: SessionId, follow: bool },
    ScrollToEnd(SessionId),
    /// Move keyboard focus to the selected session's search field.
    FocusSearch,
}
