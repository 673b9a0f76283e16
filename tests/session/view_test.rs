use tailview::session::{Badge, ChangeReason, Intent};
use tailview::tail::Category;
use tempfile::TempDir;

use super::{quiet_registry, write_log};

const MIXED: &str = "INFO start\nERROR disk full\nwarn: low memory\nERROR again\n";

#[test]
fn test_query_filters_view_and_counts() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    registry.dispatch(Intent::SetSearchQuery {
        session: id,
        query: "Error".to_string(),
    });

    let session = registry.get(id).unwrap();
    let texts: Vec<&str> = session
        .filtered_view()
        .iter()
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(texts, vec!["ERROR disk full", "ERROR again"]);
    assert_eq!(session.error_count(), 2);
    assert_eq!(session.warning_count(), 0);
    assert_eq!(session.lines().len(), 4);
}

#[test]
fn test_whitespace_query_shows_everything() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    let session = registry.get_mut(id).unwrap();
    session.set_search_query("   ");
    assert_eq!(session.filtered_len(), 4);
    assert_eq!(session.badge(), Badge::Errors(2));
}

#[test]
fn test_query_without_matches_empties_view() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    let session = registry.get_mut(id).unwrap();
    let change = session.set_search_query("nothing like this");
    assert_eq!(change.reason, ChangeReason::QueryChanged);
    assert_eq!(change.scroll_to, None);
    assert!(session.filtered_view().is_empty());
    assert_eq!(session.badge(), Badge::None);
    assert_eq!(session.last_visible_sequence(), None);
}

#[test]
fn test_filtered_view_keeps_buffer_order() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    let session = registry.get_mut(id).unwrap();
    session.set_search_query("r");
    let sequences: Vec<u64> = session.filtered_view().iter().map(|l| l.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2, 3]);
    let categories: Vec<Category> = session.filtered_view().iter().map(|l| l.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Info,
            Category::Error,
            Category::Warning,
            Category::Error
        ]
    );
}

#[test]
fn test_follow_tail_toggle() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    assert!(registry.get(id).unwrap().follow_tail());
    let changes = registry.dispatch(Intent::SetFollowTail {
        session: id,
        follow: false,
    });
    assert_eq!(
        changes[0].reason,
        ChangeReason::FollowChanged { follow: false }
    );
    assert!(!registry.get(id).unwrap().follow_tail());
}

#[test]
fn test_scroll_to_end_uses_filtered_view() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    registry.get_mut(id).unwrap().set_search_query("warn");
    let changes = registry.dispatch(Intent::ScrollToEnd(id));
    assert_eq!(changes[0].reason, ChangeReason::ScrollRequested);
    assert_eq!(changes[0].scroll_to, Some(2));
}

#[test]
fn test_switching_queries_recomputes_from_scratch() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    let session = registry.get_mut(id).unwrap();
    session.set_search_query("error");
    assert_eq!(session.filtered_len(), 2);

    session.set_search_query("warn");
    let texts: Vec<&str> = session
        .filtered_view()
        .iter()
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(texts, vec!["warn: low memory"]);
    assert_eq!(session.error_count(), 0);
    assert_eq!(session.warning_count(), 1);
    assert_eq!(session.badge(), Badge::Warnings(1));
    assert_eq!(session.last_visible_sequence(), Some(2));
}

#[test]
fn test_reapplying_same_query_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let id = registry.open(write_log(dir.path(), "app.log", MIXED));

    let session = registry.get_mut(id).unwrap();
    session.set_search_query("error");
    let first: Vec<u64> = session.filtered_view().iter().map(|l| l.sequence).collect();
    let first_counts = session.counts();

    session.set_search_query("error");
    let second: Vec<u64> = session.filtered_view().iter().map(|l| l.sequence).collect();
    assert_eq!(first, second);
    assert_eq!(session.counts(), first_counts);
    assert!(session
        .filtered_view()
        .iter()
        .all(|line| session.is_visible(line)));
}
