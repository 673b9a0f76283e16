use tailview::session::{ChangeReason, Intent};
use tempfile::TempDir;

use super::{quiet_registry, write_log};

#[test]
fn test_open_twice_shares_one_session() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), "app.log", "ERROR a\nINFO b\n");
    let mut registry = quiet_registry();

    let first = registry.open(&path);
    let second = registry.open(&path);

    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
    let session = registry.get(first).unwrap();
    assert_eq!(session.lines().len(), 2);
    assert_eq!(session.error_count(), 1);
}

#[test]
fn test_open_intent_reports_opened_then_selected() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), "app.log", "INFO a\n");
    let mut registry = quiet_registry();

    let changes = registry.dispatch(Intent::Open(vec![path.clone()]));
    let reasons: Vec<ChangeReason> = changes.iter().map(|c| c.reason).collect();
    assert_eq!(
        reasons,
        vec![
            ChangeReason::Opened,
            ChangeReason::Selected { previous: None }
        ]
    );
    assert_eq!(changes[1].scroll_to, Some(0));

    assert!(registry.dispatch(Intent::Open(vec![path])).is_empty());
}

#[test]
fn test_close_policy_walks_down_the_tabs() {
    let dir = TempDir::new().unwrap();
    for name in ["a.log", "b.log", "c.log"] {
        write_log(dir.path(), name, "INFO x\n");
    }

    let mut registry = quiet_registry();
    let a = registry.open(dir.path().join("a.log"));
    let b = registry.open(dir.path().join("b.log"));
    let c = registry.open(dir.path().join("c.log"));

    registry.select(a);
    registry.close(a);
    assert_eq!(registry.selected(), Some(b));

    registry.close(b);
    assert_eq!(registry.selected(), Some(c));

    registry.close(c);
    assert_eq!(registry.selected(), None);
    assert!(registry.is_empty());
}

#[test]
fn test_closed_ids_are_not_reused() {
    let dir = TempDir::new().unwrap();
    let path = write_log(dir.path(), "app.log", "INFO a\n");
    let mut registry = quiet_registry();

    let first = registry.open(&path);
    registry.close(first);
    let second = registry.open(&path);

    assert_ne!(first, second);
    assert!(registry.get(first).is_none());
}

#[test]
fn test_select_tracks_previous() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    let a = registry.open(write_log(dir.path(), "a.log", "INFO a\n"));
    let b = registry.open(write_log(dir.path(), "b.log", "INFO b\n"));

    assert_eq!(registry.previous(), Some(a));
    registry.dispatch(Intent::Select(a));
    assert_eq!(registry.selected(), Some(a));
    assert_eq!(registry.previous(), Some(b));

    registry.close(b);
    assert_eq!(registry.previous(), None);
    assert_eq!(registry.selected(), Some(a));
}

#[test]
fn test_totals_across_sessions() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    registry.open(write_log(dir.path(), "a.log", "ERROR a\nwarn a\n"));
    registry.open(write_log(dir.path(), "b.log", "ERROR b\nERROR c\n"));

    let totals = registry.totals();
    assert_eq!(totals.errors, 3);
    assert_eq!(totals.warnings, 1);
}

#[test]
fn test_pump_without_watchers_is_empty() {
    let dir = TempDir::new().unwrap();
    let mut registry = quiet_registry();
    registry.open(write_log(dir.path(), "a.log", "INFO a\n"));
    assert!(registry.pump().is_empty());
}
