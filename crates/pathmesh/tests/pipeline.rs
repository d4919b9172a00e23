//! End-to-end: outline producers -> node graph -> flush -> mesh.

use nalgebra::vector;
use pathmesh::prelude::*;
use pathmesh::rand::{draw_star_contour, ReplayToken, StarCfg, VertexCount};
use pathmesh::PathCfg;

fn square_commands(x0: f64, y0: f64, side: f64, ccw: bool) -> Vec<PathCommand> {
    let mut pts = vec![
        vector![x0, y0],
        vector![x0 + side, y0],
        vector![x0 + side, y0 + side],
        vector![x0, y0 + side],
    ];
    if !ccw {
        pts.reverse();
    }
    let mut cmds = vec![PathCommand::MoveTo(pts[0])];
    cmds.extend(pts[1..].iter().map(|p| PathCommand::LineTo(*p)));
    cmds.push(PathCommand::Close);
    cmds
}

#[test]
fn glyph_with_counter_fills_as_ring() {
    let mut cmds = square_commands(0.0, 0.0, 4.0, true);
    cmds.extend(square_commands(1.0, 1.0, 1.0, false));
    let mut lp = Loop::new();
    let starts = lp.append_commands(&cmds, &PathCfg::default());
    assert_eq!(starts.len(), 2);

    let mut shape = Shape::new();
    shape.add_loop(lp);
    shape.flush();
    assert!(starts
        .iter()
        .all(|k| shape.loops()[0].island_of(*k).is_ok_and(|i| i.cyclical)));

    let mut session = FillSession::new();
    assert_eq!(session.add_shape(&shape).unwrap(), 2);
    assert_eq!(session.bridge_holes(), 1);
    let mesh = session.consume(Orientation::CounterClockwise);
    assert_eq!(mesh.aborted_islands, 0);
    assert_eq!(mesh.triangles.len(), 8);
    assert!((mesh.area() - 15.0).abs() < 1e-9);
}

#[test]
fn smooth_star_mesh_matches_flattened_area() {
    let cfg = StarCfg {
        vertex_count: VertexCount::Fixed(12),
        angle_jitter_frac: 0.1,
        radial_jitter: 0.1,
        base_radius: 2.0,
    };
    for index in 0..8 {
        let contour = draw_star_contour(cfg, ReplayToken { seed: 11, index }, 0.5);
        let mut lp = Loop::new();
        let start = lp.push_contour(&contour, true).unwrap();
        lp.flush();
        let flat = 0.5 * lp.island_sample_winding(start).unwrap();
        assert!(flat > 0.0);

        let mut session = FillSession::new();
        session.add_loop(&lp).unwrap();
        let mesh = session.consume(Orientation::CounterClockwise);
        assert_eq!(mesh.aborted_islands, 0, "index {index}");
        assert!((mesh.area() - flat).abs() < 1e-9, "index {index}");
    }
}

#[test]
fn deinflected_shape_keeps_its_area() {
    let contour = draw_star_contour(StarCfg::default(), ReplayToken { seed: 5, index: 1 }, 1.0);
    let mut lp = Loop::new();
    let start = lp.push_contour(&contour, true).unwrap();
    lp.flush();
    let before = lp.island_winding(start).unwrap();

    let mut shape = Shape::new();
    shape.add_loop(lp);
    shape.deinflect_all().unwrap();
    shape.flush();
    let lp = &shape.loops()[0];
    let after = lp.island_winding(start).unwrap();
    assert!((before - after).abs() < 1e-9 * before.abs().max(1.0));
}
