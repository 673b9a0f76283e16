//! Session module tests.

mod registry_test;
mod view_test;

use std::path::{Path, PathBuf};

use tailview::config::{SessionConfig, TailConfig};
use tailview::session::SessionRegistry;

/// Registry for synchronous tests; without a runtime no watch is armed.
pub(crate) fn quiet_registry() -> SessionRegistry {
    let tail = TailConfig {
        debounce_ms: 10,
        poll_interval_ms: 0,
        hold_partial_lines: false,
    };
    SessionRegistry::with_config(tail, SessionConfig::default())
}

pub(crate) fn write_log(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Verify the public session types are exported from the library.
#[test]
fn test_all_session_types_exported() {
    use tailview::session::{
        Badge, CategoryCounts, ChangeReason, Intent, LogSession, SessionEvent, SessionId,
        ViewChange,
    };

    let id = SessionId::new(0);
    let _ = ViewChange::new(id, ChangeReason::Opened);
    let _ = Intent::FocusSearch;
    let _ = CategoryCounts::default().badge() == Badge::None;
    let _: fn(&LogSession) -> SessionId = LogSession::id;
    let _: Option<SessionEvent> = None;
}
