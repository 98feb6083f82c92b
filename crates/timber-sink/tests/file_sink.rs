//! Integration tests for file-backed trees.
//!
//! These tests plant real file sinks and inspect what lands on disk.

use std::sync::Arc;
use std::thread;

use test_support::{TempLog, TestError, global_forest_lock};
use timber::{AndroidLevels, Forest, Logger, MAX_LOG_LENGTH, Tree};
use timber_sink::{ConfigError, ForestConfig, LineMode, TreeSpec, WriterSink};

// ============================================================================
// Direct sinks
// ============================================================================

/// Verifies records are appended, not truncated, across sink instances.
#[test]
fn file_sink_appends() {
    let log = TempLog::new().expect("temp dir");

    for word in ["first", "second"] {
        let tree = Tree::new(AndroidLevels, WriterSink::append(log.path()).expect("open"));
        tree.tag("Run").info(word, &[]).expect("info");
    }

    assert_eq!(log.contents(), "I/Run: first\nI/Run: second\n");
}

/// Verifies a message over the limit becomes several prefixed lines.
#[test]
fn long_message_is_chunked_on_disk() {
    let log = TempLog::new().expect("temp dir");
    let tree = Tree::new(AndroidLevels, WriterSink::append(log.path()).expect("open"));

    let message = format!("line1\n{}", "A".repeat(5000));
    tree.tag("Big").debug(&message, &[]).expect("debug");

    let contents = log.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "D/Big: line1");
    assert_eq!(lines[1].len(), "D/Big: ".len() + MAX_LOG_LENGTH);
    assert_eq!(lines[2].len(), "D/Big: ".len() + 1000);
}

/// Verifies the error's trace text follows the message.
#[test]
fn error_trace_is_written_after_message() {
    let log = TempLog::new().expect("temp dir");
    let tree = Tree::new(AndroidLevels, WriterSink::append(log.path()).expect("open"));

    let error = TestError::caused_by("write failed", TestError::new("quota exceeded"));
    tree.tag("Disk").error_with(&error, "flush", &[]).expect("error_with");

    assert_eq!(
        log.contents(),
        "E/Disk: flush\nwrite failed\nCaused by: quota exceeded\n"
    );
}

/// Verifies concurrent writers never interleave within a record.
#[test]
fn concurrent_writes_stay_whole() {
    let log = TempLog::new().expect("temp dir");
    let sink = Arc::new(WriterSink::append(log.path()).expect("open").with_line_mode(LineMode::WithNewline));
    let tree = Arc::new(Tree::from_shared(Arc::new(AndroidLevels), sink));

    let workers: Vec<_> = (0..4)
        .map(|n| {
            let tree = tree.clone();
            thread::spawn(move || {
                for i in 0..50_i32 {
                    tree.tag(format!("W{n}"))
                        .info("item %03d", &[i.into()])
                        .expect("info");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    let contents = log.contents();
    assert_eq!(contents.lines().count(), 200);
    assert!(contents.lines().all(|line| line.starts_with("I/W") && line.contains(": item ")));
}

// ============================================================================
// Configuration
// ============================================================================

/// Verifies a config token plants a working file tree into a private forest.
#[test]
fn config_plants_file_tree() {
    let log = TempLog::new().expect("temp dir");
    let config = ForestConfig::from_tokens([format!("file:{}:16", log.path().display())])
        .expect("valid spec");
    assert!(matches!(config.trees()[0], TreeSpec::File { max_length: 16, .. }));

    let forest = Forest::new();
    assert_eq!(config.plant_into(&forest).expect("plant"), 1);
    forest.tag("Cfg").warn("0123456789abcdefXYZ", &[]).expect("warn");

    assert_eq!(log.contents(), "W/Cfg: 0123456789abcdef\nW/Cfg: XYZ\n");
}

/// Verifies config-built trees work through the global facade.
#[test]
fn config_plants_into_global_forest() {
    let _guard = global_forest_lock();
    let log = TempLog::new().expect("temp dir");
    let config = ForestConfig::parse_list(&format!("file:{}", log.path().display())).expect("valid list");

    config.plant_into(timber::global()).expect("plant");
    timber::tag("Global");
    timber::info("through the facade", &[]).expect("info");
    timber::uproot_all();

    assert_eq!(log.contents(), "I/Global: through the facade\n");
}

/// Verifies an unopenable file is reported with its path.
#[test]
fn unopenable_file_reports_path() {
    let log = TempLog::new().expect("temp dir");
    let bad = log.path().join("not-a-dir").join("x.log");
    let err = TreeSpec::File {
        path: bad.clone(),
        max_length: MAX_LOG_LENGTH,
    }
    .build()
    .unwrap_err();
    match err {
        ConfigError::OpenFile { path, .. } => assert_eq!(path, bad),
        other => panic!("expected OpenFile, got {other:?}"),
    }
}
