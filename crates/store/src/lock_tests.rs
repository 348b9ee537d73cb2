// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn fast_cfg() -> LockConfig {
    LockConfig {
        timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        max_age: Duration::from_secs(300),
    }
}

#[test]
fn lock_path_appends_suffix() {
    let p = PathLock::lock_path_for(Path::new("/x/t-1.md"));
    assert_eq!(p, PathBuf::from("/x/t-1.md.lock"));
}

#[test]
fn acquire_and_release() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("t-1.md");
    let lock_path = PathLock::lock_path_for(&target);
    {
        let _lock = PathLock::acquire(&target, &fast_cfg()).unwrap();
        assert!(lock_path.exists());
    }
    assert!(!lock_path.exists(), "lock file should be removed on drop");
}

#[test]
fn second_acquire_times_out_while_held() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("t-1.md");
    let _held = PathLock::acquire(&target, &fast_cfg()).unwrap();
    let err = PathLock::acquire(&target, &fast_cfg());
    assert!(matches!(err, Err(StoreError::LockTimeout { .. })));
}

#[test]
fn stale_lock_is_reaped() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("t-1.md");
    let lock_path = PathLock::lock_path_for(&target);
    // Simulate an abandoned lock from a crashed process.
    std::fs::write(&lock_path, "").unwrap();
    let cfg = LockConfig {
        max_age: Duration::ZERO,
        ..fast_cfg()
    };
    std::thread::sleep(Duration::from_millis(20));
    let _lock = PathLock::acquire(&target, &cfg).unwrap();
}

#[test]
fn sequential_acquires_succeed() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("t-1.md");
    for _ in 0..3 {
        let _lock = PathLock::acquire(&target, &fast_cfg()).unwrap();
    }
}
