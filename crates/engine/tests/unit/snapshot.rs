//! Snapshot tests: round-trips, byte-stability, resumed determinism, and
//! rejection of damaged files.

use alvm_core::{Config, Engine, SnapshotError};
use pretty_assertions::assert_eq;

fn seeded_with_life(order: u32) -> Engine {
    let config = Config::from_json(&format!(
        r#"{{"memory": {{"order": {order}}}, "evolver": {{"seed": [101, 202, 303, 404]}}}}"#
    ))
    .unwrap();
    let mut engine = Engine::with_config(&config);
    let _ = engine.create_process(0, 6);
    let _ = engine.create_process(32, 6);
    for _ in 0..250 {
        engine.step();
    }
    engine
}

fn assert_same_state(a: &Engine, b: &Engine) {
    assert_eq!(a.cycle(), b.cycle());
    assert_eq!(a.epoch(), b.epoch());
    assert_eq!(a.memory().order(), b.memory().order());
    assert_eq!(a.memory().allocated(), b.memory().allocated());
    assert_eq!(a.memory().cells(), b.memory().cells());
    for op in alvm_core::isa::ALL {
        assert_eq!(a.memory().inst_count(op), b.memory().inst_count(op));
    }
    assert_eq!(a.evolver().state(), b.evolver().state());
    assert_eq!(
        a.evolver().last_changed_address,
        b.evolver().last_changed_address
    );
    assert_eq!(a.procs().count(), b.procs().count());
    assert_eq!(a.procs().capacity(), b.procs().capacity());
    assert_eq!(a.procs().head(), b.procs().head());
    assert_eq!(a.procs().tail(), b.procs().tail());
    for pidx in 0..a.procs().capacity() {
        assert_eq!(a.procs().get(pidx), b.procs().get(pidx), "slot {pidx}");
    }
}

#[test]
fn save_then_load_restores_the_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.alvm");

    let engine = seeded_with_life(8);
    engine.save(&path).unwrap();
    let restored = Engine::load(&path).unwrap();

    assert_same_state(&engine, &restored);
    restored.validate();
}

#[test]
fn saving_a_restored_engine_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.alvm");
    let second = dir.path().join("second.alvm");

    let engine = seeded_with_life(8);
    engine.save(&first).unwrap();
    let restored = Engine::load(&first).unwrap();
    restored.save(&second).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn fresh_engine_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.alvm");

    let engine = Engine::new(4);
    engine.save(&path).unwrap();
    let restored = Engine::load(&path).unwrap();

    assert_same_state(&engine, &restored);
}

#[test]
fn a_restored_run_continues_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fork.alvm");

    let mut original = seeded_with_life(8);
    original.save(&path).unwrap();
    let mut restored = Engine::load(&path).unwrap();

    for _ in 0..500 {
        original.step();
        restored.step();
    }

    assert_same_state(&original, &restored);
}

#[test]
fn truncated_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.alvm");

    let engine = seeded_with_life(6);
    engine.save(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    match Engine::load(&path) {
        Err(SnapshotError::Truncated) => {}
        other => panic!("expected truncation rejection, got {other:?}"),
    }
}

#[test]
fn tampered_histograms_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tampered.alvm");

    let engine = seeded_with_life(6);
    engine.save(&path).unwrap();

    // The NOP0 histogram entry sits after the engine section (12 bytes) and
    // the first five memory words (20 bytes).
    let mut bytes = std::fs::read(&path).unwrap();
    let offset = 12 + 20;
    let word = u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
    bytes[offset..offset + 4].copy_from_slice(&word.wrapping_add(1).to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    match Engine::load(&path) {
        Err(SnapshotError::Corrupt(_)) => {}
        other => panic!("expected corruption rejection, got {other:?}"),
    }
}

#[test]
fn missing_files_surface_as_io_errors() {
    match Engine::load("/nonexistent/alvm/world.alvm") {
        Err(SnapshotError::Io(_)) => {}
        other => panic!("expected an i/o error, got {other:?}"),
    }
}
