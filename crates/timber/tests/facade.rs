//! Integration tests for the process-wide facade.
//!
//! Every test holds the global forest lock so planted trees from one test
//! never observe calls made by another.

use std::sync::Arc;

use test_support::{
    FailingSink, Observed, RecordingSink, TestError, global_forest_lock, recording_tree, tree_with,
};
use timber::{AndroidLevels, ConsecutiveLevels, LogError, Logger, PlantError, Severity};

// ============================================================================
// Planting
// ============================================================================

/// Verifies a planted tree is listed exactly once and disappears on uproot.
#[test]
fn plant_then_uproot_round_trip() {
    let _guard = global_forest_lock();
    let (tree, _) = recording_tree();

    timber::plant(tree.clone());
    let planted = timber::forest();
    assert_eq!(planted.iter().filter(|t| Arc::ptr_eq(t, &tree)).count(), 1);
    assert_eq!(timber::tree_count(), 1);

    timber::uproot(&tree).expect("planted tree uproots");
    assert!(timber::forest().iter().all(|t| !Arc::ptr_eq(t, &tree)));
}

/// Verifies insertion order survives a batch plant.
#[test]
fn plant_all_keeps_insertion_order() {
    let _guard = global_forest_lock();
    let (first, _) = recording_tree();
    let (second, _) = recording_tree();
    let (third, _) = recording_tree();

    timber::plant(first.clone());
    timber::plant_all([second.clone(), third.clone()]);

    let ids: Vec<_> = timber::forest().iter().map(|t| t.id()).collect();
    assert_eq!(ids, vec![first.id(), second.id(), third.id()]);
}

/// Verifies uprooting a tree that was never planted is a configuration error.
#[test]
fn uproot_of_unplanted_tree_fails() {
    let _guard = global_forest_lock();
    let (tree, _) = recording_tree();
    assert_eq!(timber::uproot(&tree), Err(PlantError::NotPlanted(tree.id())));
}

/// Verifies the forest copy does not change when trees are planted later.
#[test]
fn forest_is_a_point_in_time_copy() {
    let _guard = global_forest_lock();
    let (first, _) = recording_tree();
    timber::plant(first);
    let before = timber::forest();

    let (second, _) = recording_tree();
    timber::plant(second);
    assert_eq!(before.len(), 1);
    assert_eq!(timber::tree_count(), 2);
}

// ============================================================================
// Dispatch
// ============================================================================

/// Verifies each planted tree emits exactly once per accepted call.
#[test]
fn each_call_emits_once_per_tree() {
    let _guard = global_forest_lock();
    let (a, sink_a) = recording_tree();
    let (b, sink_b) = recording_tree();
    timber::plant_all([a, b]);

    timber::info("hello", &[]).expect("info");
    timber::warn("careful", &[]).expect("warn");

    assert_eq!(sink_a.messages(), vec!["hello", "careful"]);
    assert_eq!(sink_b.messages(), vec!["hello", "careful"]);
}

/// Verifies each tree maps a severity through its own level set.
#[test]
fn severity_uses_each_trees_own_levels() {
    let _guard = global_forest_lock();
    let plain = RecordingSink::new();
    let android = RecordingSink::new();
    timber::plant(tree_with(ConsecutiveLevels, plain.clone()));
    timber::plant(tree_with(AndroidLevels, android.clone()));

    timber::trace("t", &[]).expect("trace");
    timber::debug("d", &[]).expect("debug");
    timber::info("i", &[]).expect("info");
    timber::warn("w", &[]).expect("warn");
    timber::error("e", &[]).expect("error");
    timber::fatal("f", &[]).expect("fatal");

    let plain: Vec<i32> = plain.emitted().iter().map(|e| e.priority).collect();
    let android: Vec<i32> = android.emitted().iter().map(|e| e.priority).collect();
    assert_eq!(plain, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(android, vec![2, 3, 4, 5, 6, 7]);
}

/// Verifies a raw priority reaches every tree unchanged.
#[test]
fn raw_priority_is_not_mapped() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    timber::log(17, "raw %s", &["value".into()]).expect("log");
    let emitted = sink.emitted();
    assert_eq!(emitted[0].priority, 17);
    assert_eq!(emitted[0].message, "raw value");
}

/// Verifies no sink is touched after uprooting everything.
#[test]
fn uproot_all_silences_every_sink() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);
    timber::uproot_all();

    for severity in Severity::ALL {
        timber::as_tree()
            .log_severity(
                severity,
                timber::Record::new(timber::Caller::here(), None, "gone", &[]),
            )
            .expect("dispatch");
    }
    timber::error("gone", &[]).expect("error");
    assert!(sink.observed().is_empty());
    assert_eq!(timber::tree_count(), 0);
}

/// Verifies a rejected call never reaches tag resolution or emit.
#[test]
fn rejected_call_stops_after_should_log() {
    let _guard = global_forest_lock();
    let sink = RecordingSink::rejecting();
    timber::plant(tree_with(ConsecutiveLevels, sink.clone()));

    timber::info("filtered", &[]).expect("info");
    let observed = sink.observed();
    assert_eq!(observed.len(), 1);
    assert!(matches!(observed[0], Observed::ShouldLog { .. }));
}

/// Verifies the trace text replaces an empty message without a blank line.
#[test]
fn empty_message_with_error_uses_trace_text() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    let error = TestError::caused_by("request failed", TestError::new("timed out"));
    timber::error_with(&error, "", &[]).expect("error_with");

    let emitted = sink.emitted();
    assert_eq!(emitted[0].message, "request failed\nCaused by: timed out");
    assert_eq!(emitted[0].error.as_deref(), Some("request failed"));
}

/// Verifies message and trace text are joined by a newline.
#[test]
fn message_and_error_are_joined() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    let error = TestError::new("disk full");
    timber::warn_with(&error, "saving %s", &["draft".into()]).expect("warn_with");
    assert_eq!(sink.messages(), vec!["saving draft\ndisk full"]);
}

/// Verifies an empty message without an error is dropped after filtering.
#[test]
fn empty_message_without_error_is_dropped() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    timber::info("", &[]).expect("info");
    let observed = sink.observed();
    assert_eq!(observed.len(), 1);
    assert!(matches!(observed[0], Observed::ShouldLog { .. }));
}

/// Verifies format errors surface to the caller.
#[test]
fn format_error_is_propagated() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    let err = timber::info("%d items", &[]).and_then(|()| timber::info("%d items", &[true.into()]));
    assert!(matches!(err, Err(LogError::Format(_))));
    assert_eq!(sink.messages(), vec!["%d items"]);
}

// ============================================================================
// Fault isolation
// ============================================================================

/// Verifies a failing sink does not prevent later trees from logging.
#[test]
fn failing_sink_is_isolated() {
    let _guard = global_forest_lock();
    let failing = Arc::new(FailingSink::default());
    timber::plant(tree_with(ConsecutiveLevels, failing.clone()));
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    timber::info("still delivered", &[]).expect("broadcast succeeds");
    assert_eq!(failing.attempts(), 1);
    assert_eq!(sink.messages(), vec!["still delivered"]);
}

/// Verifies a single tree reports its own sink failure.
#[test]
fn single_tree_returns_sink_error() {
    let tree = tree_with(ConsecutiveLevels, Arc::new(FailingSink::default()));
    let err = tree.info("lost", &[]).unwrap_err();
    assert!(matches!(err, LogError::Sink(_)));
}

// ============================================================================
// Caller tags
// ============================================================================

/// Verifies the free functions derive the tag from this file's name.
#[test]
fn free_functions_tag_with_file_stem() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    timber::info("where am I", &[]).expect("info");
    let emitted = sink.emitted();
    assert_eq!(emitted[0].tag, "facade");

    let located = sink.observed().into_iter().find_map(|step| match step {
        Observed::ResolveTag { file, module_path, .. } => Some((file, module_path)),
        _ => None,
    });
    let (file, module_path) = located.expect("tag resolved");
    assert!(file.ends_with("facade.rs"));
    assert_eq!(module_path, None);
}

/// Verifies the macros record the module path and format with Rust syntax.
#[test]
fn macros_capture_module_path() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    let attempts = 3;
    timber::warn!("retrying in {}s ({}%)", attempts, 50).expect("warn!");
    let error = TestError::new("refused");
    timber::error!(error: &error, "connect to {} failed", "db").expect("error!");
    timber::log!(9, "raw {}", "priority").expect("log!");

    let emitted = sink.emitted();
    assert_eq!(emitted[0].message, "retrying in 3s (50%)");
    assert_eq!(emitted[0].priority, 3);
    assert_eq!(emitted[0].tag, "facade");
    assert_eq!(emitted[1].message, "connect to db failed\nrefused");
    assert_eq!(emitted[2].priority, 9);

    let module_paths: Vec<_> = sink
        .observed()
        .into_iter()
        .filter_map(|step| match step {
            Observed::ResolveTag { module_path, .. } => Some(module_path),
            _ => None,
        })
        .collect();
    assert!(module_paths.iter().all(|path| *path == Some("facade")));
}

/// Verifies the broadcast target can be injected as a plain logger.
#[test]
fn as_tree_behaves_like_the_facade() {
    let _guard = global_forest_lock();
    let (tree, sink) = recording_tree();
    timber::plant(tree);

    fn log_through(logger: &dyn Logger) -> Result<(), LogError> {
        logger.info("injected", &[])
    }

    log_through(timber::as_tree()).expect("injected logger");
    assert_eq!(sink.messages(), vec!["injected"]);
}
