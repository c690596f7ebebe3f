use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{ElementId, Point, Rectangle};
use crate::quadtree::QuadTree;
#[cfg(feature = "rtree")]
use crate::rtree::RTree;
use crate::spatial::{LeafQuery, RadiusScan, SpatialIndex};
use crate::utils::ForceTreeConfig;

fn random_points(rng: &mut StdRng, n: usize) -> Vec<(ElementId, Point)> {
    (0..n)
        .map(|i| (ElementId(i), Point::new(rng.random_range(0.0..600.0), rng.random_range(0.0..600.0))))
        .collect()
}

#[test]
fn test_closest_element_equivalence() {
    let mut rng = StdRng::seed_from_u64(2024);
    let config = ForceTreeConfig::default();

    for &n in &[1usize, 7, 64, 1000] {
        let points = random_points(&mut rng, n);
        let mut scan = RadiusScan::new();
        let mut quadtree = QuadTree::new(600.0, 600.0, config).unwrap();
        scan.rebuild(&points);
        quadtree.rebuild(&points);
        #[cfg(feature = "rtree")]
        let mut rtree = RTree::new(config).unwrap();
        #[cfg(feature = "rtree")]
        rtree.rebuild(&points);

        for _ in 0..1000 {
            let x = rng.random_range(-200.0..800.0);
            let y = rng.random_range(-200.0..800.0);
            let expected = scan.closest_element(x, y);
            assert!(expected.is_some());
            assert_eq!(quadtree.closest_element(x, y), expected, "quadtree, n={}, ({}, {})", n, x, y);
            #[cfg(feature = "rtree")]
            assert_eq!(rtree.closest_element(x, y), expected, "rtree, n={}, ({}, {})", n, x, y);
        }
    }
}

#[test]
fn test_equivalence_on_a_lattice_with_ties() {
    // Lattice points make exact distance ties common; every index must break them the same way.
    let points: Vec<(ElementId, Point)> = (0..144)
        .map(|i| (ElementId(i), Point::new((i % 12) as f64 * 50.0, (i / 12) as f64 * 50.0)))
        .collect();
    let config = ForceTreeConfig::default();
    let mut scan = RadiusScan::new();
    let mut quadtree = QuadTree::new(600.0, 600.0, config).unwrap();
    scan.rebuild(&points);
    quadtree.rebuild(&points);
    #[cfg(feature = "rtree")]
    let mut rtree = RTree::new(config).unwrap();
    #[cfg(feature = "rtree")]
    rtree.rebuild(&points);

    for qx in 0..24 {
        for qy in 0..24 {
            let (x, y) = (qx as f64 * 25.0, qy as f64 * 25.0);
            let expected = scan.closest_element(x, y);
            assert_eq!(quadtree.closest_element(x, y), expected, "quadtree ({}, {})", x, y);
            #[cfg(feature = "rtree")]
            assert_eq!(rtree.closest_element(x, y), expected, "rtree ({}, {})", x, y);
        }
    }
    // (0,0), (50,0), (0,50) and (50,50) are equidistant; the smallest x then y wins.
    assert_eq!(scan.closest_element(25.0, 25.0), Some(ElementId(0)));
}

#[test]
fn test_ties_prefer_smaller_position_then_id() {
    // Ids run against position order so an id-only tie-break would answer differently.
    let points = vec![
        (ElementId(0), Point::new(350.0, 300.0)),
        (ElementId(1), Point::new(300.0, 350.0)),
        (ElementId(2), Point::new(300.0, 250.0)),
        (ElementId(3), Point::new(250.0, 300.0)),
        (ElementId(4), Point::new(500.0, 500.0)),
        (ElementId(5), Point::new(500.0, 500.0)),
    ];
    let config = ForceTreeConfig::default();
    let mut scan = RadiusScan::new();
    let mut quadtree = QuadTree::new(600.0, 600.0, config).unwrap();
    scan.rebuild(&points);
    quadtree.rebuild(&points);
    #[cfg(feature = "rtree")]
    let mut rtree = RTree::new(ForceTreeConfig::new(None, None, Some(2))).unwrap();
    #[cfg(feature = "rtree")]
    rtree.rebuild(&points);

    let queries = [
        ((300.0, 300.0), ElementId(3)),
        ((325.0, 325.0), ElementId(1)),
        ((500.0, 500.0), ElementId(4)),
        ((400.0, 400.0), ElementId(1)),
    ];
    for ((x, y), expected) in queries {
        assert_eq!(scan.closest_element(x, y), Some(expected), "scan ({}, {})", x, y);
        assert_eq!(quadtree.closest_element(x, y), Some(expected), "quadtree ({}, {})", x, y);
        #[cfg(feature = "rtree")]
        assert_eq!(rtree.closest_element(x, y), Some(expected), "rtree ({}, {})", x, y);
    }
}

#[test]
fn test_non_finite_positions_are_skipped_by_every_index() {
    let points = vec![
        (ElementId(0), Point::new(f64::NAN, 1.0)),
        (ElementId(1), Point::new(10.0, 10.0)),
        (ElementId(2), Point::new(20.0, f64::INFINITY)),
    ];
    let config = ForceTreeConfig::default();
    let mut scan = RadiusScan::new();
    let mut quadtree = QuadTree::new(600.0, 600.0, config).unwrap();
    scan.rebuild(&points);
    quadtree.rebuild(&points);

    assert_eq!(scan.len(), 1);
    assert_eq!(quadtree.len(), 1);
    assert_eq!(scan.containing_leaf(LeafQuery::Element(ElementId(0))), None);
    assert_eq!(scan.containing_leaf(LeafQuery::Element(ElementId(2))), None);
    assert_eq!(scan.closest_element(0.0, 0.0), Some(ElementId(1)));
    assert_eq!(quadtree.closest_element(0.0, 0.0), Some(ElementId(1)));

    #[cfg(feature = "rtree")]
    {
        let mut rtree = RTree::new(config).unwrap();
        rtree.rebuild(&points);
        assert_eq!(rtree.len(), 1);
        assert_eq!(rtree.containing_leaf(LeafQuery::Element(ElementId(0))), None);
        assert_eq!(rtree.closest_element(0.0, 0.0), Some(ElementId(1)));
    }
}

#[test]
fn test_radius_scan_limits() {
    let mut scan = RadiusScan::with_max_radius(5.0);
    scan.rebuild(&[(ElementId(0), Point::new(0.0, 0.0)), (ElementId(1), Point::new(100.0, 0.0))]);
    assert_eq!(scan.max_radius(), Some(5.0));
    assert_eq!(scan.closest_element(3.0, 4.0), Some(ElementId(0)));
    assert_eq!(scan.closest_element(3.0, 4.1), None);
    assert_eq!(scan.closest_within(50.0, 0.0, 60.0), Some(ElementId(0)));
    assert_eq!(scan.closest_within(50.0, 0.0, 49.0), None);

    let fresh = scan.fresh();
    assert!(fresh.is_empty());
    assert_eq!(fresh.max_radius(), Some(5.0));
}

#[test]
fn test_radius_scan_leaves_are_points() {
    let mut scan = RadiusScan::new();
    scan.rebuild(&[(ElementId(3), Point::new(4.0, 5.0))]);
    assert_eq!(
        scan.containing_leaf(LeafQuery::Element(ElementId(3))),
        Some(Rectangle::at_point(Point::new(4.0, 5.0)))
    );
    assert_eq!(scan.containing_leaf(Point::new(4.0, 5.0).into()), Some(Rectangle::at_point(Point::new(4.0, 5.0))));
    assert_eq!(scan.containing_leaf(Point::new(4.0, 6.0).into()), None);
}

#[test]
fn test_range_queries_agree() {
    let mut rng = StdRng::seed_from_u64(77);
    let points = random_points(&mut rng, 600);
    let config = ForceTreeConfig::default();
    let mut scan = RadiusScan::new();
    let mut quadtree = QuadTree::new(600.0, 600.0, config).unwrap();
    scan.rebuild(&points);
    quadtree.rebuild(&points);
    #[cfg(feature = "rtree")]
    let mut rtree = RTree::new(config).unwrap();
    #[cfg(feature = "rtree")]
    rtree.rebuild(&points);

    for _ in 0..100 {
        let area = Rectangle::new(
            rng.random_range(-100.0..600.0),
            rng.random_range(-100.0..600.0),
            rng.random_range(0.0..300.0),
            rng.random_range(0.0..300.0),
        );
        let expected = scan.elements_within(&area);
        assert_eq!(quadtree.elements_within(&area), expected);
        #[cfg(feature = "rtree")]
        assert_eq!(rtree.elements_within(&area), expected);
    }
}

#[test]
fn test_fresh_keeps_configuration() {
    let config = ForceTreeConfig::new(Some(9), None, None);
    let mut tree = QuadTree::new(300.0, 200.0, config).unwrap();
    tree.rebuild(&[(ElementId(0), Point::new(1.0, 1.0))]);

    let fresh = tree.fresh();
    assert!(fresh.is_empty());
    assert_eq!(fresh.config(), &config);
    assert_eq!(fresh.bounds(), tree.bounds());
}
