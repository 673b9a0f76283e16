use std::io::Write;

use tailview::tail::{read_all, Category, LineSplitter, LogTailer, Snapshot, TailError};
use tempfile::{NamedTempFile, TempDir};

fn log_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_read_all_drops_blank_lines() {
    let file = log_file("INFO start\n\n\r\nERROR disk full\r\nwarn: low memory");
    let lines = read_all(file.path());

    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["INFO start", "ERROR disk full", "warn: low memory"]);
    let sequences: Vec<u64> = lines.iter().map(|l| l.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
}

#[test]
fn test_read_all_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    assert!(read_all(&dir.path().join("missing.log")).is_empty());
}

#[test]
fn test_snapshot_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.log");
    let err = Snapshot::read(&path, &mut LineSplitter::new(false)).unwrap_err();
    assert!(matches!(err, TailError::FileDeleted(p) if p == path));
}

#[test]
fn test_snapshot_of_invalid_utf8_is_empty_but_advances() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, b'\n', 0xff]).unwrap();
    file.flush().unwrap();

    let snapshot = Snapshot::read(file.path(), &mut LineSplitter::new(false)).unwrap();
    assert!(snapshot.lines.is_empty());
    assert_eq!(snapshot.offset, 4);
}

#[tokio::test]
async fn test_tailer_reads_only_appended_lines() {
    let mut file = log_file("INFO start\n");
    let mut tailer = LogTailer::new(file.path().to_path_buf(), false);

    let snapshot = tailer.read_snapshot().unwrap();
    assert_eq!(snapshot.len(), 1);

    let read = tailer.read_appended().await.unwrap();
    assert!(read.lines.is_empty());
    assert!(!read.truncated);

    file.write_all(b"another ERROR here\n").unwrap();
    file.flush().unwrap();

    let read = tailer.read_appended().await.unwrap();
    assert_eq!(read.lines.len(), 1);
    assert_eq!(read.lines[0].sequence, 1);
    assert_eq!(read.lines[0].category, Category::Error);
    assert_eq!(tailer.next_sequence(), 2);
}

#[tokio::test]
async fn test_tailer_completes_line_written_in_two_parts() {
    let mut file = log_file("");
    let mut tailer = LogTailer::new(file.path().to_path_buf(), true);
    tailer.read_snapshot().unwrap();

    file.write_all(b"ERROR disk ").unwrap();
    file.flush().unwrap();
    assert!(tailer.read_appended().await.unwrap().lines.is_empty());

    file.write_all(b"full\n").unwrap();
    file.flush().unwrap();
    let read = tailer.read_appended().await.unwrap();
    assert_eq!(read.lines.len(), 1);
    assert_eq!(read.lines[0].text, "ERROR disk full");
}

#[tokio::test]
async fn test_tailer_detects_truncation() {
    let file = log_file("first line that is long\nsecond line\n");
    let mut tailer = LogTailer::new(file.path().to_path_buf(), false);
    tailer.read_snapshot().unwrap();

    std::fs::write(file.path(), "ERROR fresh\n").unwrap();

    let read = tailer.read_appended().await.unwrap();
    assert!(read.truncated);
    assert_eq!(read.lines.len(), 1);
    assert_eq!(read.lines[0].text, "ERROR fresh");
    assert_eq!(read.lines[0].sequence, 2);
}

#[tokio::test]
async fn test_tailer_reports_deleted_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    std::fs::write(&path, "INFO a\n").unwrap();

    let mut tailer = LogTailer::new(path.clone(), false);
    tailer.read_snapshot().unwrap();
    std::fs::remove_file(&path).unwrap();

    let err = tailer.read_appended().await.unwrap_err();
    assert!(matches!(err, TailError::FileDeleted(_)));
}
