use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::models::{ElementId, Point, Rectangle};
use crate::quadtree::QuadTree;
use crate::spatial::{LeafQuery, RadiusScan, RebuildOutcome, SharedIndex, SpatialIndex};
use crate::utils::ForceTreeConfig;

fn shared_tree() -> SharedIndex<QuadTree> {
    SharedIndex::new(QuadTree::new(600.0, 600.0, ForceTreeConfig::default()).unwrap())
}

fn row(n: usize, y: f64) -> Vec<(ElementId, Point)> {
    (0..n).map(|i| (ElementId(i), Point::new(i as f64 * 10.0, y))).collect()
}

#[test]
fn test_old_snapshot_survives_rebuild() {
    let shared = shared_tree();
    shared.rebuild(&row(10, 100.0));
    let held = shared.snapshot();
    assert_eq!(shared.generation(), 1);

    shared.rebuild(&row(3, 500.0));
    assert_eq!(shared.generation(), 2);

    assert_eq!(held.len(), 10);
    assert_eq!(held.closest_element(85.0, 100.0), Some(ElementId(8)));
    assert_eq!(shared.len(), 3);
    assert_eq!(shared.closest_element(85.0, 100.0), Some(ElementId(2)));
}

#[test]
fn test_cancelled_rebuild_is_not_published() {
    let shared = shared_tree();
    shared.rebuild(&row(4, 50.0));
    let before = shared.snapshot();

    let cancel = AtomicBool::new(true);
    assert_eq!(shared.rebuild_cancellable(&row(20, 300.0), &cancel), RebuildOutcome::Abandoned);
    assert!(Arc::ptr_eq(&before, &shared.snapshot()));
    assert_eq!(shared.generation(), 1);

    cancel.store(false, Ordering::Release);
    assert_eq!(shared.rebuild_cancellable(&row(20, 300.0), &cancel), RebuildOutcome::Published);
    assert_eq!(shared.len(), 20);
}

#[test]
fn test_clear_publishes_empty_index() {
    let shared = shared_tree();
    shared.rebuild(&row(5, 10.0));
    shared.clear();
    assert!(shared.is_empty());
    assert_eq!(shared.closest_element(0.0, 10.0), None);
    assert_eq!(
        shared.containing_leaf(LeafQuery::Point(Point::new(1.0, 1.0))),
        Some(Rectangle::new(0.0, 0.0, 600.0, 600.0))
    );

    shared.rebuild(&[]);
    assert_eq!(shared.closest_element(0.0, 10.0), None);
}

#[test]
fn test_readers_never_see_partial_trees() {
    let shared = Arc::new(shared_tree());
    let small = row(10, 100.0);
    let large = row(50, 200.0);
    shared.rebuild(&small);

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut reads = 0usize;
                while !stop.load(Ordering::Acquire) || reads == 0 {
                    let snapshot = shared.snapshot();
                    let len = snapshot.len();
                    assert!(len == 10 || len == 50, "observed partial index of {} elements", len);
                    let everything = snapshot.elements_within(&Rectangle::new(0.0, 0.0, 600.0, 600.0));
                    assert_eq!(everything.len(), len);
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    for i in 0..200 {
        shared.rebuild(if i % 2 == 0 { &large } else { &small });
    }
    stop.store(true, Ordering::Release);
    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(shared.generation(), 201);
}

#[test]
fn test_shared_radius_scan() {
    let shared = SharedIndex::new(RadiusScan::with_max_radius(15.0));
    shared.rebuild(&row(3, 0.0));
    assert_eq!(shared.closest_element(19.0, 0.0), Some(ElementId(2)));
    assert_eq!(shared.closest_element(40.0, 0.0), None);
    assert_eq!(shared.snapshot().max_radius(), Some(15.0));
}
