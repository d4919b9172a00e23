use super::*;
use crate::cfg::{PathCfg, SAMPLE_STEPS};
use crate::curve::BridgeKind;
use crate::geom::ring_signed_area;
use crate::rand::{draw_star_ring, ReplayToken, StarCfg, VertexCount};
use crate::Vec2;
use nalgebra::vector;
use proptest::prelude::*;

fn polygon(lp: &mut Loop, pts: &[Vec2]) -> NodeKey {
    let contour: Vec<ContourPoint> = pts.iter().map(|p| ContourPoint::corner(*p)).collect();
    lp.push_contour(&contour, true).expect("non-empty contour")
}

fn square(lp: &mut Loop, x0: f64, y0: f64, side: f64) -> NodeKey {
    polygon(
        lp,
        &[
            vector![x0, y0],
            vector![x0 + side, y0],
            vector![x0 + side, y0 + side],
            vector![x0, y0 + side],
        ],
    )
}

/// Open two-node chain carrying the S-curve (0,0) (1,1) (2,-1) (3,0).
fn s_curve(lp: &mut Loop) -> (NodeKey, NodeKey) {
    let a = lp.add_node(vector![0.0, 0.0]);
    let b = lp.add_node(vector![3.0, 0.0]);
    lp.connect(a, b).unwrap();
    lp.set_tangent_out(a, vector![1.0, 1.0]).unwrap();
    lp.set_tangent_in(b, vector![-1.0, -1.0]).unwrap();
    (a, b)
}

#[test]
fn square_island_classification() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    let islands = lp.islands();
    assert_eq!(islands.len(), 1);
    assert!(islands[0].cyclical);
    assert_eq!(islands[0].len, 4);
    assert_eq!(lp.path_leftmost(start).unwrap(), ChainKind::Cyclical);
    for k in lp.chain(start) {
        assert_eq!(lp.bridge_kind(k).unwrap(), BridgeKind::Line);
    }
    assert!((lp.island_winding(start).unwrap() - 1.0).abs() < 1e-12);
    assert!(lp.test_validity().is_ok());
}

#[test]
fn open_chain_ends() {
    let mut lp = Loop::new();
    let keys: Vec<NodeKey> = (0..4).map(|i| lp.add_node(vector![i as f64, 0.0])).collect();
    for w in keys.windows(2) {
        lp.connect(w[0], w[1]).unwrap();
    }
    assert_eq!(lp.path_leftmost(keys[2]).unwrap(), ChainKind::Open(keys[0]));
    assert_eq!(lp.path_rightmost(keys[1]).unwrap(), ChainKind::Open(keys[3]));
    assert_eq!(lp.bridge(keys[3]).unwrap(), crate::curve::Bridge::None);
    let island = lp.island_of(keys[2]).unwrap();
    assert_eq!(island.start, keys[0]);
    assert!(!island.cyclical);
}

#[test]
fn flush_rebuilds_samples_and_gates_queries() {
    let mut lp = Loop::new();
    let (a, b) = s_curve(&mut lp);
    assert!(lp.is_dirty());
    assert_eq!(lp.island_samples(a), Err(PathError::NeedsFlush));
    assert_eq!(lp.flush(), 2);
    assert!(!lp.is_dirty());
    assert_eq!(lp.node(a).unwrap().samples().len(), SAMPLE_STEPS);
    assert_eq!(lp.node(b).unwrap().samples().len(), 1);
    let poly = lp.island_polyline(a).unwrap();
    assert_eq!(poly.len(), SAMPLE_STEPS + 1);
    assert_eq!(poly[0], vector![0.0, 0.0]);
    assert_eq!(*poly.last().unwrap(), vector![3.0, 0.0]);

    // Moving the end node dirties its predecessor, whose bridge changed.
    lp.set_position(b, vector![4.0, 0.0]).unwrap();
    assert!(lp.node(a).unwrap().is_dirty());
    assert!(lp.node(b).unwrap().is_dirty());
    assert_eq!(lp.flush(), 2);
    assert_eq!(lp.flush(), 0);
}

#[test]
fn sample_neighbours_cross_node_boundaries() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    lp.flush();
    let next = lp.node(start).unwrap().next().unwrap();
    let s = lp.next_sample(start, 0).unwrap().unwrap();
    assert_eq!(s.owner, next);
    let last = lp.node(start).unwrap().prev().unwrap();
    let p = lp.prev_sample(start, 0).unwrap().unwrap();
    assert_eq!(p.owner, last);
}

#[test]
fn symmetric_mode_mirrors_tangents() {
    let mut lp = Loop::new();
    let k = lp.add_node(vector![0.0, 0.0]);
    lp.set_continuity(k, Continuity::Symmetric).unwrap();
    lp.set_tangent_in(k, vector![0.3, -1.7]).unwrap();
    let n = lp.node(k).unwrap();
    assert_eq!(n.tangent_out(), -n.tangent_in());
    lp.set_tangent_out(k, vector![2.0, 5.0]).unwrap();
    let n = lp.node(k).unwrap();
    assert_eq!(n.tangent_in(), vector![-2.0, -5.0]);
}

#[test]
fn smooth_mode_keeps_lengths() {
    let mut lp = Loop::new();
    let k = lp.add_node(vector![0.0, 0.0]);
    lp.set_tangent_out(k, vector![0.0, 2.0]).unwrap();
    lp.set_continuity(k, Continuity::Smooth).unwrap();
    lp.set_tangent_in(k, vector![3.0, 0.0]).unwrap();
    let n = lp.node(k).unwrap();
    assert!((n.tangent_out() - vector![-2.0, 0.0]).norm() < 1e-12);
}

#[test]
fn enforce_continuity_ignores_zero_anchor() {
    let (tin, tout) = enforce_continuity(
        Continuity::Smooth,
        TangentSide::In,
        Vec2::zeros(),
        vector![1.0, 0.0],
    );
    assert_eq!(tin, Vec2::zeros());
    assert_eq!(tout, vector![1.0, 0.0]);
}

#[test]
fn smoothing_a_corner_rounds_it() {
    let mut lp = Loop::new();
    let a = lp.add_node(vector![0.0, 0.0]);
    let b = lp.add_node(vector![1.0, 1.0]);
    let c = lp.add_node(vector![2.0, 0.0]);
    lp.connect(a, b).unwrap();
    lp.connect(b, c).unwrap();
    lp.set_tangents_smooth(b).unwrap();
    let n = lp.node(b).unwrap();
    assert_eq!(n.continuity(), Continuity::Smooth);
    assert!((n.tangent_out() - vector![0.5, 0.0]).norm() < 1e-12);
    assert!((n.tangent_in() - vector![-0.5, 0.0]).norm() < 1e-12);
    assert_eq!(lp.bridge_kind(a).unwrap(), BridgeKind::BezierCurve);
}

#[test]
fn bridge_kind_follows_tangent_flags() {
    let mut lp = Loop::new();
    let a = lp.add_node(vector![0.0, 0.0]);
    let b = lp.add_node(vector![1.0, 0.0]);
    lp.connect(a, b).unwrap();
    assert_eq!(lp.bridge_kind(a).unwrap(), BridgeKind::Line);

    lp.set_tangent_out(a, vector![0.0, 1.0]).unwrap();
    assert_eq!(lp.bridge_kind(a).unwrap(), BridgeKind::BezierCurve);

    lp.set_use_tangents(a, false, false).unwrap();
    assert_eq!(lp.bridge_kind(a).unwrap(), BridgeKind::Line);

    // Enabled but zero counts as absent.
    lp.set_tangent_out(a, Vec2::zeros()).unwrap();
    lp.set_tangent_in(b, Vec2::zeros()).unwrap();
    assert_eq!(lp.bridge_kind(a).unwrap(), BridgeKind::Line);

    lp.set_tangent_in(b, vector![0.0, -1.0]).unwrap();
    assert_eq!(lp.bridge_kind(a).unwrap(), BridgeKind::BezierCurve);
    assert_eq!(lp.bridge_kind(b).unwrap(), BridgeKind::None);
}

#[test]
fn s_curve_deinflects_once() {
    let mut lp = Loop::new();
    let (a, b) = s_curve(&mut lp);
    assert!(lp.deinflect(a).unwrap());
    let mid = lp.node(a).unwrap().next().unwrap();
    assert_ne!(mid, b);
    assert!((lp.node(mid).unwrap().position() - vector![1.5, 0.0]).norm() < 1e-12);
    assert!(!lp.deinflect(a).unwrap());
    assert!(!lp.deinflect(mid).unwrap());
    assert_eq!(lp.deinflect_island(a).unwrap(), 0);
}

#[test]
fn subdivide_preserves_geometry() {
    let mut lp = Loop::new();
    let (a, _) = s_curve(&mut lp);
    let before = lp.bridge(a).unwrap().as_cubic().unwrap();
    let t = 0.3;
    let mid = lp.subdivide(a, t).unwrap();
    let left = lp.bridge(a).unwrap().as_cubic().unwrap();
    let right = lp.bridge(mid).unwrap().as_cubic().unwrap();
    for i in 0..=10 {
        let u = i as f64 / 10.0;
        assert!((left.eval(u) - before.eval(u * t)).norm() < 1e-12);
        assert!((right.eval(u) - before.eval(t + u * (1.0 - t))).norm() < 1e-12);
    }
    assert!(lp.test_validity().is_ok());
    assert!(matches!(
        lp.subdivide(a, 1.0),
        Err(PathError::InvalidParameter { .. })
    ));
}

#[test]
fn subdivide_relaxes_symmetric_neighbour() {
    let mut lp = Loop::new();
    let (a, _) = s_curve(&mut lp);
    lp.set_continuity(a, Continuity::Symmetric).unwrap();
    lp.set_tangent_out(a, vector![1.0, 1.0]).unwrap();
    lp.subdivide(a, 0.25).unwrap();
    let n = lp.node(a).unwrap();
    assert_eq!(n.continuity(), Continuity::Smooth);
    assert!((n.tangent_out() - vector![0.25, 0.25]).norm() < 1e-12);
}

#[test]
fn subdivide_line_inserts_corner() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 2.0);
    let mid = lp.subdivide(start, 0.5).unwrap();
    assert_eq!(lp.node(mid).unwrap().position(), vector![1.0, 0.0]);
    assert_eq!(lp.island_of(start).unwrap().len, 5);
    assert!((lp.island_winding(start).unwrap() - 4.0).abs() < 1e-12);
}

#[test]
fn winding_is_independent_of_start() {
    let mut lp = Loop::new();
    let ring = draw_star_ring(StarCfg::default(), ReplayToken { seed: 11, index: 0 });
    let start = polygon(&mut lp, &ring);
    let expected = ring_signed_area(&ring);
    for k in lp.chain(start).collect::<Vec<_>>() {
        assert!((lp.island_winding(k).unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn winding_number_inside_outside() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    assert_eq!(lp.winding_number(start, vector![0.5, 0.3]).unwrap(), 1);
    assert_eq!(lp.winding_number(start, vector![1.5, 0.3]).unwrap(), 0);
    assert_eq!(lp.winding_number(start, vector![-0.5, 0.3]).unwrap(), 0);
    lp.reverse_island(start).unwrap();
    assert_eq!(lp.winding_number(start, vector![0.5, 0.3]).unwrap(), -1);
    assert!(lp.island_winding(start).unwrap() < 0.0);
}

#[test]
fn winding_number_needs_cycle() {
    let mut lp = Loop::new();
    let (a, _) = s_curve(&mut lp);
    assert_eq!(
        lp.winding_number(a, vector![1.0, 0.0]),
        Err(PathError::NotCyclical(a))
    );
}

#[test]
fn curved_winding_number() {
    // Circle-ish: four symmetric nodes.
    let mut lp = Loop::new();
    let k = 0.552_284_75;
    let pts = [
        (vector![1.0, 0.0], vector![0.0, k]),
        (vector![0.0, 1.0], vector![-k, 0.0]),
        (vector![-1.0, 0.0], vector![0.0, -k]),
        (vector![0.0, -1.0], vector![k, 0.0]),
    ];
    let contour: Vec<ContourPoint> = pts
        .iter()
        .map(|(p, t)| ContourPoint {
            position: *p,
            tangent_in: -t,
            tangent_out: *t,
            continuity: Continuity::Symmetric,
        })
        .collect();
    let start = lp.push_contour(&contour, true).unwrap();
    assert_eq!(lp.winding_number(start, vector![0.1, 0.2]).unwrap(), 1);
    assert_eq!(lp.winding_number(start, vector![0.9, 0.9]).unwrap(), 0);
    let area = lp.island_winding(start).unwrap();
    assert!((area - std::f64::consts::PI).abs() < 1e-2, "{area}");
    let (node, _, top) = lp.island_extreme(start, Axis::Y, true).unwrap();
    assert!((top.y - 1.0).abs() < 1e-9);
    assert!(lp.contains(node));
}

#[test]
fn ray_hits_across_island() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    let hits = lp
        .intersect_island(start, vector![-1.0, 0.5], vector![1.0, 0.0], LineExtent::Ray)
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert!((hits[0].1.point - vector![0.0, 0.5]).norm() < 1e-12);
    assert!((hits[1].1.point - vector![1.0, 0.5]).norm() < 1e-12);
    let seg = lp
        .intersect_island(
            start,
            vector![-1.0, 0.5],
            vector![1.5, 0.0],
            LineExtent::Segment,
        )
        .unwrap();
    assert_eq!(seg.len(), 1);
}

#[test]
fn closest_point_and_bounds() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 2.0);
    let c = lp.closest_point(start, vector![1.0, -3.0]).unwrap().unwrap();
    assert!((c.point - vector![1.0, 0.0]).norm() < 1e-12);
    assert!((c.distance - 3.0).abs() < 1e-12);
    let b = lp.island_bounds(start).unwrap();
    assert_eq!(b.min, vector![0.0, 0.0]);
    assert_eq!(b.max, vector![2.0, 2.0]);
    let (_, right) = lp.max_on_axis(start, Axis::X).unwrap();
    assert_eq!(right, vector![2.0, 0.0]);
    assert!((lp.arc_length(start, 8).unwrap() - 2.0).abs() < 1e-12);
    lp.flush();
    assert!((lp.arc_length_sampled(start).unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn bridge_joins_hole_into_outer() {
    let mut lp = Loop::new();
    let outer = square(&mut lp, 0.0, 0.0, 4.0);
    let hole = square(&mut lp, 1.0, 1.0, 1.0);
    lp.reverse_island(hole).unwrap();
    assert_eq!(lp.islands().len(), 2);

    let (a, b) = lp.make_bridge(outer, 0.0, hole, 0.0).unwrap();
    assert!(lp.test_validity().is_ok());
    let islands = lp.islands();
    assert_eq!(islands.len(), 1);
    assert!(islands[0].cyclical);
    assert_eq!(islands[0].len, 10);
    assert_eq!(lp.node(a).unwrap().next(), Some(b));
    assert!((lp.island_winding(a).unwrap() - 15.0).abs() < 1e-9);
    for k in [a, b] {
        assert_eq!(lp.node(k).unwrap().continuity(), Continuity::Disconnected);
    }
    assert_eq!(lp.make_bridge(a, 0.0, b, 0.0), Err(PathError::SameIsland));
}

#[test]
fn bridge_subdivides_interior_parameters() {
    let mut lp = Loop::new();
    let outer = square(&mut lp, 0.0, 0.0, 4.0);
    let hole = square(&mut lp, 1.0, 1.0, 1.0);
    lp.reverse_island(hole).unwrap();
    let (a, _) = lp.make_bridge(outer, 0.5, hole, 0.0).unwrap();
    assert_eq!(lp.node(a).unwrap().position(), vector![2.0, 0.0]);
    assert_eq!(lp.islands()[0].len, 11);
}

#[test]
fn cut_and_rejoin_operations() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    let keys: Vec<NodeKey> = lp.chain(start).collect();

    lp.dissolve(keys[1]).unwrap();
    assert_eq!(lp.len(), 3);
    assert_eq!(lp.node(keys[0]).unwrap().next(), Some(keys[2]));
    assert!(lp.islands()[0].cyclical);

    lp.detach(keys[3]).unwrap();
    let islands = lp.islands();
    assert_eq!(islands.len(), 1);
    assert!(!islands[0].cyclical);
    assert_eq!(islands[0].start, keys[0]);

    lp.disconnect(keys[2]).unwrap();
    assert_eq!(lp.islands().len(), 3);
    lp.remove(keys[2]).unwrap();
    assert!(!lp.contains(keys[2]));
    assert_eq!(lp.set_position(keys[2], Vec2::zeros()), Err(PathError::UnknownNode(keys[2])));
    assert!(lp.test_validity().is_ok());
}

#[test]
fn validity_detects_broken_links() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    let other = lp.add_node(vector![5.0, 5.0]);
    lp.get_mut(start).unwrap().next = Some(other);
    assert!(matches!(
        lp.test_validity(),
        Err(ValidityError::AsymmetricLink { .. })
    ));
}

#[test]
fn duplicate_is_independent() {
    let mut lp = Loop::new();
    let start = square(&mut lp, 0.0, 0.0, 1.0);
    let copy = lp.duplicate_island(start).unwrap();
    assert_eq!(lp.islands().len(), 2);
    lp.set_position(copy, vector![-3.0, -3.0]).unwrap();
    assert_eq!(lp.node(start).unwrap().position(), vector![0.0, 0.0]);
    assert!(lp.test_validity().is_ok());
}

#[test]
fn merge_remaps_keys() {
    let mut a = Loop::new();
    square(&mut a, 0.0, 0.0, 1.0);
    let mut b = Loop::new();
    let bs = square(&mut b, 5.0, 5.0, 1.0);
    let remap = a.merge(b);
    assert_eq!(a.len(), 8);
    let moved = remap[bs];
    assert_eq!(a.node(moved).unwrap().position(), vector![5.0, 5.0]);
    assert_eq!(a.islands().len(), 2);
    assert!(a.test_validity().is_ok());
}

#[test]
fn inflate_grows_both_orientations() {
    let mut lp = Loop::new();
    let ccw = square(&mut lp, 0.0, 0.0, 1.0);
    lp.inflate_island(ccw, 0.5).unwrap();
    assert!((lp.island_winding(ccw).unwrap() - 4.0).abs() < 1e-12);

    let mut lp = Loop::new();
    let cw = square(&mut lp, 0.0, 0.0, 1.0);
    lp.reverse_island(cw).unwrap();
    lp.inflate_island(cw, 0.5).unwrap();
    assert!((lp.island_winding(cw).unwrap() + 4.0).abs() < 1e-12);
}

#[test]
fn commands_round_trip() {
    let cmds = vec![
        PathCommand::MoveTo(vector![0.0, 0.0]),
        PathCommand::LineTo(vector![2.0, 0.0]),
        PathCommand::CubicTo(vector![2.0, 1.0], vector![1.0, 2.0], vector![0.0, 2.0]),
        PathCommand::LineTo(vector![0.0, 0.0]),
        PathCommand::Close,
    ];
    let mut lp = Loop::new();
    let starts = lp.append_commands(&cmds, &PathCfg::default());
    assert_eq!(starts.len(), 1);
    assert_eq!(lp.len(), 3);
    assert!(lp.islands()[0].cyclical);
    assert_eq!(lp.to_commands(starts[0]).unwrap(), cmds);
}

#[test]
fn open_subpaths_export_without_close() {
    let cmds = vec![
        PathCommand::MoveTo(vector![0.0, 0.0]),
        PathCommand::LineTo(vector![1.0, 0.0]),
        PathCommand::MoveTo(vector![5.0, 0.0]),
        PathCommand::LineTo(vector![6.0, 1.0]),
        PathCommand::LineTo(vector![7.0, 0.0]),
        PathCommand::Close,
    ];
    let mut lp = Loop::new();
    let starts = lp.append_commands(&cmds, &PathCfg::default());
    assert_eq!(starts.len(), 2);
    assert_eq!(lp.to_commands(starts[0]).unwrap(), cmds[..2].to_vec());
    let second = lp.to_commands(starts[1]).unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(second.last(), Some(&PathCommand::Close));
}

#[test]
fn shape_flushes_all_loops() {
    let mut shape = Shape::new();
    let mut a = Loop::new();
    s_curve(&mut a);
    let mut b = Loop::new();
    square(&mut b, 0.0, 0.0, 1.0);
    shape.add_loop(a);
    shape.add_loop(b);
    assert!(shape.is_dirty());
    assert_eq!(shape.deinflect_all().unwrap(), 1);
    assert_eq!(shape.flush(), 3 + 4);
    assert!(!shape.is_dirty());
    assert_eq!(shape.islands().len(), 2);
    let bounds = shape.bounds().unwrap();
    assert_eq!(bounds.max.x, 3.0);
}

#[test]
fn winding_number_level_with_vertices() {
    let mut lp = Loop::new();
    let tri = polygon(
        &mut lp,
        &[vector![0.0, 0.0], vector![2.0, 0.0], vector![1.0, 1.0]],
    );
    // Ray through the apex, then along the base edge.
    assert_eq!(lp.winding_number(tri, vector![-1.0, 1.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(tri, vector![-1.0, 0.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(tri, vector![3.0, 0.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(tri, vector![1.0, 0.5]).unwrap(), 1);

    let sq = square(&mut lp, 0.0, 0.0, 2.0);
    assert_eq!(lp.winding_number(sq, vector![-1.0, 0.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(sq, vector![-1.0, 2.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(sq, vector![1.0, 1.0]).unwrap(), 1);

    let diamond = polygon(
        &mut lp,
        &[
            vector![1.0, 0.0],
            vector![2.0, 1.0],
            vector![1.0, 2.0],
            vector![0.0, 1.0],
        ],
    );
    assert_eq!(lp.winding_number(diamond, vector![0.5, 1.0]).unwrap(), 1);
    assert_eq!(lp.winding_number(diamond, vector![-1.0, 1.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(diamond, vector![3.0, 1.0]).unwrap(), 0);

    // Reflex vertex at (2,2) on a notched square.
    let notch = polygon(
        &mut lp,
        &[
            vector![0.0, 0.0],
            vector![4.0, 0.0],
            vector![4.0, 4.0],
            vector![2.0, 2.0],
            vector![0.0, 4.0],
        ],
    );
    assert_eq!(lp.winding_number(notch, vector![1.0, 2.0]).unwrap(), 1);
    assert_eq!(lp.winding_number(notch, vector![3.0, 2.0]).unwrap(), 1);
    assert_eq!(lp.winding_number(notch, vector![-1.0, 2.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(notch, vector![5.0, 2.0]).unwrap(), 0);
}

#[test]
fn curved_winding_number_level_with_extrema() {
    let mut lp = Loop::new();
    // Arch over the base from (0,0) to (2,0), peaking at y = 1.125; drawn clockwise.
    let start = lp
        .push_contour(
            &[
                ContourPoint {
                    position: vector![0.0, 0.0],
                    tangent_in: Vec2::zeros(),
                    tangent_out: vector![0.5, 1.5],
                    continuity: Continuity::Disconnected,
                },
                ContourPoint {
                    position: vector![2.0, 0.0],
                    tangent_in: vector![-0.5, 1.5],
                    tangent_out: Vec2::zeros(),
                    continuity: Continuity::Disconnected,
                },
            ],
            true,
        )
        .unwrap();
    assert_eq!(lp.bridge_kind(start).unwrap(), BridgeKind::BezierCurve);
    assert_eq!(lp.winding_number(start, vector![1.0, 0.5]).unwrap(), -1);
    assert_eq!(lp.winding_number(start, vector![-1.0, 1.125]).unwrap(), 0);
    assert_eq!(lp.winding_number(start, vector![-1.0, 0.0]).unwrap(), 0);
    assert_eq!(lp.winding_number(start, vector![3.0, 0.5]).unwrap(), 0);
}

#[test]
fn deinflect_island_reaches_fixed_point() {
    let p0 = vector![4.30, 3.51];
    let p1 = vector![-1.12, 0.71];
    let p2 = vector![4.64, 8.37];
    let p3 = vector![-0.73, -9.11];
    let mut lp = Loop::new();
    let a = lp.add_node(p0);
    let b = lp.add_node(p3);
    lp.connect(a, b).unwrap();
    lp.set_tangent_out(a, p1 - p0).unwrap();
    lp.set_tangent_in(b, p2 - p3).unwrap();

    // Cutting between the x-turns leaves a half that still turns twice in y.
    assert!(lp.deinflect_island(a).unwrap() >= 2);
    assert_eq!(lp.deinflect_island(a).unwrap(), 0);
    for k in lp.chain(a) {
        if let crate::curve::Bridge::Curve(c) = lp.bridge(k).unwrap() {
            assert_eq!(c.inflection_split(), None);
        }
    }
    assert!(lp.test_validity().is_ok());
}

#[test]
fn terminator_bridge_has_empty_bounds() {
    let mut lp = Loop::new();
    let lone = lp.add_node(vector![3.0, 4.0]);
    assert!(lp.bridge_bounds(lone).unwrap().is_empty());
    let b = lp.island_bounds(lone).unwrap();
    assert_eq!(b.min, vector![3.0, 4.0]);
    assert_eq!(b.max, vector![3.0, 4.0]);

    let (a, end) = s_curve(&mut lp);
    assert!(lp.bridge_bounds(end).unwrap().is_empty());
    assert!(!lp.bridge_bounds(a).unwrap().is_empty());
    let chain = lp.island_bounds(a).unwrap();
    assert_eq!(chain.min.x, 0.0);
    assert_eq!(chain.max.x, 3.0);
}

#[test]
fn flush_all_counts_rebuilt_nodes() {
    let mut lp = Loop::new();
    square(&mut lp, 0.0, 0.0, 1.0);
    assert_eq!(lp.flush_all(), 4);
    assert!(!lp.is_dirty());

    // A link to a removed node cannot be sampled and is not counted.
    let stale = lp.add_node(vector![9.0, 9.0]);
    lp.remove(stale).unwrap();
    let dangling = lp.add_node(vector![5.0, 5.0]);
    lp.get_mut(dangling).unwrap().next = Some(stale);
    assert_eq!(lp.flush_all(), 4);
    assert!(!lp.is_dirty());
}

proptest! {
    #[test]
    fn star_winding_matches_shoelace(seed in 0u64..1000, n in 3usize..40) {
        let cfg = StarCfg { vertex_count: VertexCount::Fixed(n), ..StarCfg::default() };
        let ring = draw_star_ring(cfg, ReplayToken { seed, index: 0 });
        let mut lp = Loop::new();
        let start = polygon(&mut lp, &ring);
        let w = lp.island_winding(start).unwrap();
        prop_assert!((w - ring_signed_area(&ring)).abs() < 1e-9);
        lp.flush();
        prop_assert!((lp.island_sample_winding(start).unwrap() - 2.0 * w).abs() < 1e-9);
        prop_assert_eq!(lp.winding_number(start, Vec2::zeros()).unwrap(), 1);
    }

    #[test]
    fn subdivision_keeps_island_area(seed in 0u64..1000, t in 0.05f64..0.95) {
        let ring = draw_star_ring(StarCfg::default(), ReplayToken { seed, index: 1 });
        let mut lp = Loop::new();
        let start = polygon(&mut lp, &ring);
        lp.set_tangents_symmetric(start).unwrap();
        let before = lp.island_winding(start).unwrap();
        lp.subdivide(start, t).unwrap();
        prop_assert!(lp.test_validity().is_ok());
        prop_assert!((lp.island_winding(start).unwrap() - before).abs() < 1e-9);
    }

    #[test]
    fn deinflect_island_converges(c in prop::array::uniform8(-10.0f64..10.0)) {
        let p0 = vector![c[0], c[1]];
        let p3 = vector![c[6], c[7]];
        let mut lp = Loop::new();
        let a = lp.add_node(p0);
        let b = lp.add_node(p3);
        lp.connect(a, b).unwrap();
        lp.set_tangent_out(a, vector![c[2], c[3]] - p0).unwrap();
        lp.set_tangent_in(b, vector![c[4], c[5]] - p3).unwrap();
        lp.deinflect_island(a).unwrap();
        prop_assert_eq!(lp.deinflect_island(a).unwrap(), 0);
        prop_assert!(lp.test_validity().is_ok());
    }
}
