//! End-to-end clearing scenarios over simple pockets.

use cavalier_contours::polyline::{PlineSourceMut, PlineVertex, Polyline};
use pocketkit_clearing::{
    build_mat, build_tree, roll_tree, total_length, CellVoronoi, ClearingParams, EmitOptions,
    MedialTree, MillDirection, PathItemKind, PocketClearing, Region, SliceStore,
};
use pocketkit_core::Point;

fn polyline(points: &[(f64, f64)]) -> Polyline<f64> {
    let mut p = Polyline::new();
    for &(x, y) in points {
        p.add_vertex(PlineVertex::new(x, y, 0.0));
    }
    p.set_is_closed(true);
    p
}

fn square(size: f64) -> Polyline<f64> {
    polyline(&[(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)])
}

fn circle(cx: f64, cy: f64, r: f64) -> Polyline<f64> {
    let mut p = Polyline::new();
    p.add_vertex(PlineVertex::new(cx - r, cy, 1.0));
    p.add_vertex(PlineVertex::new(cx + r, cy, 1.0));
    p.set_is_closed(true);
    p
}

fn square_params() -> ClearingParams {
    ClearingParams {
        cutter_d: 2.0,
        max_engagement: 0.8,
        min_engagement: 0.2,
        mill_direction: MillDirection::Cw,
        ..Default::default()
    }
}

/// Runs the pipeline up to slice placement so invariants can be checked
/// on the internal state.
fn roll_pocket(
    outer: Polyline<f64>,
    islands: Vec<Polyline<f64>>,
    params: &ClearingParams,
) -> (Region, MedialTree, SliceStore) {
    let region = Region::build(
        outer,
        islands,
        params.cutter_radius(),
        params.margin,
        params.general_tolerance,
    );
    let mat = build_mat(&region, &CellVoronoi, params.general_tolerance);
    let mut tree = build_tree(&mat, &region, params).expect("pocket should be feasible");
    let store = roll_tree(&mut tree, &region, params).expect("roll should succeed");
    (region, tree, store)
}

fn check_invariants(region: &Region, tree: &MedialTree, store: &SliceStore, p: &ClearingParams) {
    assert!(!store.is_empty(), "no slices were placed");

    let relaxed = p.max_engagement * (1.0 + 10.0 * p.engagement_tolerance);
    for (id, slice) in store.slices.iter().enumerate() {
        // Every ball is inscribed in the region (up to tolerance).
        let clearance = region.nearest_boundary_distance(slice.ball.center);
        assert!(
            clearance + p.general_tolerance >= slice.ball.radius,
            "slice {} ball sticks out: clearance {} < radius {}",
            id,
            clearance,
            slice.ball.radius
        );

        match slice.parent {
            None => assert_eq!(id, 0, "only the first slice may be parentless"),
            Some(parent) => {
                assert!(parent < id, "parent {} placed after slice {}", parent, id);
                // Consecutive cuts stay connected.
                assert!(
                    store.slices[parent].ball.distance_to(&slice.ball) < 0.0,
                    "slice {} does not overlap its parent ball",
                    id
                );
                // Engagement band, including the relaxed overshoot.
                assert!(
                    slice.max_engagement >= p.min_engagement
                        && slice.max_engagement <= relaxed,
                    "slice {} engagement {} outside [{}, {}]",
                    id,
                    slice.max_engagement,
                    p.min_engagement,
                    relaxed
                );
            }
        }

        // Parent chains reach the root without cycles.
        let mut hops = 0;
        let mut cur = slice.parent;
        while let Some(next) = cur {
            cur = store.slices[next].parent;
            hops += 1;
            assert!(hops <= store.len(), "cycle in slice parents at {}", id);
        }
    }

    // Children are visited short-first everywhere.
    for branch in &tree.branches {
        let dists: Vec<f64> = branch
            .children
            .iter()
            .map(|&c| tree.branches[c].deep_dist)
            .collect();
        for w in dists.windows(2) {
            assert!(w[0] <= w[1] + 1e-12, "children not sorted: {:?}", dists);
        }
    }
}

#[test]
fn test_unit_square_pocket() {
    let params = square_params();
    let (region, tree, store) = roll_pocket(square(10.0), Vec::new(), &params);
    check_invariants(&region, &tree, &store, &params);

    // The root slice sits at the deepest point of the square.
    let root = &store.slices[0];
    assert!(
        root.ball.center.nearly_equals(Point::new(5.0, 5.0), 0.5),
        "root slice off-centre: {:?}",
        root.ball.center
    );
    assert!(root.ball.radius > 3.0);

    // And the emitted path opens with a spiral there.
    let mut clearing = PocketClearing::new(square(10.0), Vec::new());
    clearing.params = params;
    let path = clearing.run().unwrap();
    assert!(!path.is_empty());
    assert_eq!(path[0].kind, PathItemKind::Spiral);
    let spiral_start = path[0].start_point().unwrap();
    assert!(spiral_start.nearly_equals(Point::new(5.0, 5.0), 0.5));
    assert!(path.iter().any(|i| i.kind == PathItemKind::Segment));

    // Total length stays within a sane multiple of the cut geometry.
    let len = total_length(&path);
    assert!(len.is_finite() && len > 0.0);
    assert!(len < 2000.0, "path length exploded: {}", len);
}

#[test]
fn test_square_with_island_splits_corridors() {
    let params = square_params();
    let (region, tree, store) = roll_pocket(
        square(10.0),
        vec![circle(5.0, 5.0, 2.0)],
        &params,
    );
    check_invariants(&region, &tree, &store, &params);

    // The corridor ring around the island forks the tree.
    assert!(
        tree.traversal_order().len() >= 2,
        "expected the island to split the medial tree"
    );

    // No slice ball may reach into the island.
    for slice in &store.slices {
        let to_island = slice.ball.center.distance_to(&Point::new(5.0, 5.0));
        assert!(
            to_island + 1e-3 >= 2.0 + slice.ball.radius,
            "ball at {:?} overlaps the island",
            slice.ball.center
        );
    }
}

#[test]
fn test_narrow_channel_terminates_but_lobe_is_cut() {
    // 10x10 lobe with a 3-wide channel (1.5x cutter diameter) to x=16.
    let outer = polyline(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 4.0),
        (16.0, 4.0),
        (16.0, 7.0),
        (10.0, 7.0),
        (10.0, 10.0),
        (0.0, 10.0),
    ]);
    let params = square_params();
    let (region, tree, store) = roll_pocket(outer, Vec::new(), &params);
    check_invariants(&region, &tree, &store, &params);

    // The lobe is cut.
    assert!(
        store.slices.iter().any(|s| s.ball.center.x < 10.0),
        "no slices in the main lobe"
    );
    // Nothing traverses past the channel's passable width.
    for slice in &store.slices {
        assert!(
            slice.ball.radius >= params.min_passable_mic() - 1e-9,
            "slice ball thinner than the passable limit"
        );
    }
}

#[test]
fn test_startpoint_outside_yields_empty_path() {
    let mut clearing = PocketClearing::new(square(10.0), Vec::new());
    clearing.params = square_params();
    clearing.set_startpoint(Some(Point::new(20.0, 20.0)));
    let path = clearing.run().unwrap();
    assert!(path.is_empty());
}

#[test]
fn test_startpoint_inside_seeds_the_cut() {
    let mut clearing = PocketClearing::new(square(10.0), Vec::new());
    clearing.params = square_params();
    clearing.set_startpoint(Some(Point::new(3.0, 3.0)));
    let path = clearing.run().unwrap();
    assert!(!path.is_empty());
    // Spiral starts from the user-chosen entry, not the pocket centre.
    assert_eq!(path[0].kind, PathItemKind::Spiral);
    let start = path[0].start_point().unwrap();
    assert!(
        start.nearly_equals(Point::new(3.0, 3.0), 1.0),
        "spiral anchored at {:?}",
        start
    );
}

#[test]
fn test_rerun_is_deterministic() {
    let run = || {
        let mut clearing = PocketClearing::new(square(10.0), vec![circle(5.0, 5.0, 2.0)]);
        clearing.params = square_params();
        clearing.run().unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn test_debug_mat_toggle_only_adds_debug_items() {
    let base = {
        let mut clearing = PocketClearing::new(square(10.0), Vec::new());
        clearing.params = square_params();
        clearing.run().unwrap()
    };
    let with_debug = {
        let mut clearing = PocketClearing::new(square(10.0), Vec::new());
        clearing.params = square_params();
        let emit = clearing.params.emit | EmitOptions::DEBUG_MAT;
        clearing.set_emit_options(emit);
        clearing.run().unwrap()
    };
    assert!(with_debug.iter().any(|i| i.kind == PathItemKind::DebugMat));
    let stripped: Vec<_> = with_debug
        .into_iter()
        .filter(|i| i.kind != PathItemKind::DebugMat)
        .collect();
    assert_eq!(stripped, base);
}

#[test]
fn test_conflicting_emit_options_error_at_run() {
    let mut clearing = PocketClearing::new(square(10.0), Vec::new());
    clearing.params = square_params();
    clearing.set_emit_options(clearing.params.emit | EmitOptions::SMOOTH_CHORD);
    assert!(clearing.run().is_err());
}

#[test]
fn test_smooth_chords_replace_straight_chords() {
    let mut clearing = PocketClearing::new(square(10.0), Vec::new());
    clearing.params = square_params();
    let emit = clearing
        .params
        .emit
        .without(EmitOptions::CHORD)
        .with(EmitOptions::SMOOTH_CHORD);
    clearing.set_emit_options(emit);
    clearing.set_mill_direction(MillDirection::Ccw);
    let path = clearing.run().unwrap();
    assert!(path.iter().all(|i| i.kind != PathItemKind::Chord));
}
