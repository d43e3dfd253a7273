//! Tests for listener-list mutation during dispatch under both dispatch modes.

use std::sync::{Arc, Mutex, Weak};

use nsemit::{DispatchMode, Emitter, EmitterConfig, Listener, Payload};

type Log = Arc<Mutex<Vec<String>>>;

fn make_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn emitter(mode: DispatchMode) -> Arc<Emitter<i32>> {
    Arc::new(Emitter::with_config(EmitterConfig::new().with_dispatch(mode)))
}

fn recorder(log: &Log, label: &'static str) -> Listener<i32> {
    let log = Arc::clone(log);
    Listener::from_fn(move |_: &Payload<'_, i32>| log.lock().unwrap().push(label.to_string()))
}

/// Listener that logs `label` and removes `victim` from `event`.
fn remover(
    log: &Log,
    label: &'static str,
    emitter: Weak<Emitter<i32>>,
    event: &'static str,
    victim: Arc<Mutex<Option<Listener<i32>>>>,
) -> Listener<i32> {
    let log = Arc::clone(log);
    Listener::from_fn(move |_: &Payload<'_, i32>| {
        log.lock().unwrap().push(label.to_string());
        let target = victim.lock().unwrap().clone();
        if let (Some(emitter), Some(target)) = (emitter.upgrade(), target) {
            emitter.off_listener(event, &target).unwrap();
        }
    })
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ============================================================================
// Snapshot (default)
// ============================================================================

#[test]
fn test_default_mode_is_snapshot() {
    let emitter: Emitter<i32> = Emitter::new();
    assert_eq!(emitter.config().dispatch, DispatchMode::Snapshot);
}

#[test]
fn test_snapshot_listener_removed_mid_dispatch_still_fires() {
    let emitter = emitter(DispatchMode::Snapshot);
    let log = make_log();
    let slot = Arc::new(Mutex::new(None));
    let b = recorder(&log, "b");
    *slot.lock().unwrap() = Some(b.clone());

    emitter
        .on("e", remover(&log, "a", Arc::downgrade(&emitter), "e", slot))
        .unwrap();
    emitter.on("e", &b).unwrap();

    emitter.emit("e", &[]).unwrap();
    assert_eq!(entries(&log), vec!["a", "b"]);

    emitter.emit("e", &[]).unwrap();
    assert_eq!(entries(&log), vec!["a", "b", "a"]);
}

#[test]
fn test_snapshot_listener_added_mid_dispatch_waits() {
    let emitter = emitter(DispatchMode::Snapshot);
    let log = make_log();
    let weak = Arc::downgrade(&emitter);
    let inner_log = Arc::clone(&log);
    let late = recorder(&log, "late");

    emitter
        .once(
            "e",
            Listener::from_fn(move |_: &Payload<'_, i32>| {
                inner_log.lock().unwrap().push("adder".to_string());
                if let Some(emitter) = weak.upgrade() {
                    emitter.on("e", &late).unwrap();
                }
            }),
        )
        .unwrap();

    emitter.emit("e", &[]).unwrap();
    assert_eq!(entries(&log), vec!["adder"]);

    emitter.emit("e", &[]).unwrap();
    assert_eq!(entries(&log), vec!["adder", "late"]);
}

#[test]
fn test_snapshot_self_removal_does_not_skip_neighbour() {
    let emitter = emitter(DispatchMode::Snapshot);
    let log = make_log();
    let slot = Arc::new(Mutex::new(None));
    let a = remover(&log, "a", Arc::downgrade(&emitter), "e", Arc::clone(&slot));
    *slot.lock().unwrap() = Some(a.clone());

    emitter.on("e", &a).unwrap();
    emitter.on("e", recorder(&log, "b")).unwrap();
    emitter.on("e", recorder(&log, "c")).unwrap();

    emitter.emit("e", &[]).unwrap();

    assert_eq!(entries(&log), vec!["a", "b", "c"]);
    assert_eq!(emitter.listener_count("e"), 2);
}

#[test]
fn test_snapshot_once_added_during_dispatch_survives_flush() {
    let emitter = emitter(DispatchMode::Snapshot);
    let log = make_log();
    let weak = Arc::downgrade(&emitter);
    let late = recorder(&log, "late");

    emitter
        .once(
            "e",
            Listener::from_fn(move |_: &Payload<'_, i32>| {
                if let Some(emitter) = weak.upgrade() {
                    emitter.once("e", &late).unwrap();
                }
            }),
        )
        .unwrap();

    emitter.emit("e", &[]).unwrap();
    assert_eq!(emitter.listener_count("e"), 1);

    emitter.emit("e", &[]).unwrap();
    assert_eq!(entries(&log), vec!["late"]);
    assert!(emitter.is_empty());
}

#[test]
fn test_snapshot_once_not_refired_by_nested_emit() {
    let emitter = emitter(DispatchMode::Snapshot);
    let log = make_log();
    let weak = Arc::downgrade(&emitter);
    let nested = Arc::new(Mutex::new(false));

    emitter.once("e", recorder(&log, "once")).unwrap();
    emitter
        .on(
            "e",
            Listener::from_fn(move |_: &Payload<'_, i32>| {
                let mut done = nested.lock().unwrap();
                if *done {
                    return;
                }
                *done = true;
                drop(done);
                if let Some(emitter) = weak.upgrade() {
                    emitter.emit("e", &[]).unwrap();
                }
            }),
        )
        .unwrap();

    emitter.emit("e", &[]).unwrap();

    assert_eq!(entries(&log), vec!["once"]);
    assert_eq!(emitter.listener_count("e"), 1);
}

#[test]
fn test_snapshot_once_removed_before_later_listeners_run() {
    let emitter = emitter(DispatchMode::Snapshot);
    let log = make_log();
    let weak = Arc::downgrade(&emitter);
    let counts = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&counts);

    emitter.once("e", recorder(&log, "once")).unwrap();
    emitter
        .on(
            "e",
            Listener::from_fn(move |_: &Payload<'_, i32>| {
                if let Some(emitter) = weak.upgrade() {
                    seen.lock().unwrap().push(emitter.listener_count("e"));
                }
            }),
        )
        .unwrap();

    emitter.emit("e", &[]).unwrap();

    assert_eq!(*counts.lock().unwrap(), vec![1]);
}

// ============================================================================
// Live
// ============================================================================

#[test]
fn test_live_self_removal_skips_neighbour() {
    let emitter = emitter(DispatchMode::Live);
    let log = make_log();
    let slot = Arc::new(Mutex::new(None));
    let a = remover(&log, "a", Arc::downgrade(&emitter), "e", Arc::clone(&slot));
    *slot.lock().unwrap() = Some(a.clone());

    emitter.on("e", &a).unwrap();
    emitter.on("e", recorder(&log, "b")).unwrap();
    emitter.on("e", recorder(&log, "c")).unwrap();

    emitter.emit("e", &[]).unwrap();

    // Removing index 0 shifts `b` into the slot already visited.
    assert_eq!(entries(&log), vec!["a", "c"]);
}

#[test]
fn test_live_listener_removed_ahead_is_not_called() {
    let emitter = emitter(DispatchMode::Live);
    let log = make_log();
    let slot = Arc::new(Mutex::new(None));
    let b = recorder(&log, "b");
    *slot.lock().unwrap() = Some(b.clone());

    emitter
        .on("e", remover(&log, "a", Arc::downgrade(&emitter), "e", slot))
        .unwrap();
    emitter.on("e", &b).unwrap();

    emitter.emit("e", &[]).unwrap();

    assert_eq!(entries(&log), vec!["a"]);
}

#[test]
fn test_live_once_flush_removes_matching_once_added_during_dispatch() {
    let emitter = emitter(DispatchMode::Live);
    let log = make_log();
    let weak = Arc::downgrade(&emitter);
    let late = recorder(&log, "late");

    emitter
        .once(
            "e",
            Listener::from_fn(move |_: &Payload<'_, i32>| {
                if let Some(emitter) = weak.upgrade() {
                    emitter.once("e", &late).unwrap();
                }
            }),
        )
        .unwrap();

    emitter.emit("e", &[]).unwrap();

    assert!(entries(&log).is_empty());
    assert!(emitter.is_empty());
}

#[test]
fn test_live_once_with_other_namespace_survives() {
    let emitter = emitter(DispatchMode::Live);
    let log = make_log();
    emitter.once("e.a", recorder(&log, "a")).unwrap();
    emitter.once("e.b", recorder(&log, "b")).unwrap();

    emitter.emit("e.a", &[]).unwrap();
    emitter.emit("e.a", &[]).unwrap();

    assert_eq!(entries(&log), vec!["a"]);
    assert_eq!(emitter.listener_count("e.b"), 1);
}

#[test]
fn test_modes_agree_without_mutation() {
    for mode in [DispatchMode::Snapshot, DispatchMode::Live] {
        let emitter = emitter(mode);
        let log = make_log();
        emitter.on("e.x", recorder(&log, "x")).unwrap();
        emitter.once("e", recorder(&log, "once")).unwrap();
        emitter.on("e.y", recorder(&log, "y")).unwrap();

        emitter.emit("e", &[]).unwrap().emit("e.y", &[]).unwrap();

        assert_eq!(entries(&log), vec!["x", "once", "y", "y"], "mode {}", mode);
    }
}
