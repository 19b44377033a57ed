use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use super::*;

#[test]
fn whole_file_clamps_to_current_length() {
    let served = FileBoundaries::whole_file().clamp_to(42);
    assert_eq!(served, FileBoundaries::new(0, 42));
}

#[test]
fn clamping_handles_ranges_past_the_end() {
    assert_eq!(FileBoundaries::new(10, 100).clamp_to(50), FileBoundaries::new(10, 40));
    assert_eq!(FileBoundaries::new(80, 5).clamp_to(50), FileBoundaries::new(50, 0));
    assert_eq!(FileBoundaries::new(5, 5).clamp_to(50), FileBoundaries::new(5, 5));
}

fn dynamic_file(state: &Arc<Mutex<FileBoundaries>>) -> RsynkFile {
    let state = Arc::clone(state);
    RsynkFile::new("logs/app.log", "/var/log/app.log").with_boundaries(move || {
        *state.lock().unwrap()
    })
}

#[test]
fn provider_is_evaluated_per_request() {
    let state = Arc::new(Mutex::new(FileBoundaries::new(0, 10)));
    let registry = TrackedFiles::new();
    registry.add([dynamic_file(&state)]);

    let file = registry.lookup("logs/app.log").unwrap();
    assert_eq!(file.boundaries(), FileBoundaries::new(0, 10));

    // offset only
    *state.lock().unwrap() = FileBoundaries::new(4, 10);
    assert_eq!(file.boundaries(), FileBoundaries::new(4, 10));

    // length only
    *state.lock().unwrap() = FileBoundaries::new(4, 25);
    assert_eq!(file.boundaries(), FileBoundaries::new(4, 25));

    // both
    *state.lock().unwrap() = FileBoundaries::new(7, 3);
    let again = registry.lookup("logs/app.log").unwrap();
    assert_eq!(again.boundaries(), FileBoundaries::new(7, 3));
}

#[test]
fn provider_may_read_atomics() {
    let length = Arc::new(AtomicU64::new(1));
    let observed = Arc::clone(&length);
    let file = RsynkFile::new("grow", "/tmp/grow")
        .with_boundaries(move || FileBoundaries::new(0, observed.load(Ordering::SeqCst)));

    let mut seen = Vec::new();
    for value in [1, 2, 3] {
        length.store(value, Ordering::SeqCst);
        seen.push(file.boundaries().length());
    }
    assert_eq!(seen, vec![1, 2, 3]);
}

#[test]
fn add_replaces_entries_with_the_same_path() {
    let registry = TrackedFiles::new();
    registry.add([RsynkFile::new("a", "/one")]);
    registry.add([RsynkFile::new("a", "/two"), RsynkFile::new("b", "/three")]);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.lookup("a").unwrap().disk_path(), std::path::Path::new("/two"));
    assert_eq!(registry.paths(), vec!["a".to_owned(), "b".to_owned()]);
}

#[test]
fn remove_all_clears_everything() {
    let registry = TrackedFiles::new();
    registry.add((0..10).map(|i| RsynkFile::new(format!("f{i}"), format!("/data/f{i}"))));
    assert_eq!(registry.len(), 10);

    registry.remove_all();
    assert!(registry.is_empty());
    assert!(registry.lookup("f3").is_none());
}

#[test]
fn lookups_survive_removal() {
    let registry = TrackedFiles::new();
    registry.add([RsynkFile::at("/srv/data.bin")]);
    let held = registry.lookup("/srv/data.bin").unwrap();
    registry.remove_all();
    assert_eq!(held.path(), "/srv/data.bin");
}

#[test]
fn batches_are_observed_atomically() {
    const BATCH: usize = 32;
    let registry = Arc::new(TrackedFiles::new());
    let done = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(5));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let done = Arc::clone(&done);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                while !done.load(Ordering::Acquire) {
                    let len = registry.len();
                    assert!(len == 0 || len == BATCH, "torn batch of {len}");
                }
            })
        })
        .collect();

    barrier.wait();
    for _ in 0..200 {
        registry.add((0..BATCH).map(|i| RsynkFile::new(format!("f{i}"), "/dev/null")));
        registry.remove_all();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn debug_output_names_paths() {
    let rendered = format!("{:?}", RsynkFile::new("k", "/p"));
    assert!(rendered.contains("\"k\""));
    assert!(rendered.contains("/p"));
}
