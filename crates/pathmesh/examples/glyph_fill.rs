//! Fill a small "O"-like glyph built from drawing commands and print the mesh.
//!
//! Usage:
//!   cargo run -p pathmesh --example glyph_fill
//!   cargo run -p pathmesh --example glyph_fill -- cw

use nalgebra::vector;
use pathmesh::prelude::*;
use pathmesh::PathCfg;

/// Four-arc circle as cubic commands.
fn circle(cx: f64, cy: f64, r: f64, ccw: bool) -> Vec<PathCommand> {
    let k = 0.552_284_75 * r;
    let s = if ccw { 1.0 } else { -1.0 };
    let p = |x: f64, y: f64| vector![cx + x, cy + s * y];
    vec![
        PathCommand::MoveTo(p(r, 0.0)),
        PathCommand::CubicTo(p(r, k), p(k, r), p(0.0, r)),
        PathCommand::CubicTo(p(-k, r), p(-r, k), p(-r, 0.0)),
        PathCommand::CubicTo(p(-r, -k), p(-k, -r), p(0.0, -r)),
        PathCommand::CubicTo(p(k, -r), p(r, -k), p(r, 0.0)),
        PathCommand::Close,
    ]
}

fn main() {
    let orientation = match std::env::args().nth(1).as_deref() {
        Some("cw") => Orientation::Clockwise,
        _ => Orientation::CounterClockwise,
    };
    let mut cmds = circle(0.0, 0.0, 2.0, true);
    cmds.extend(circle(0.0, 0.0, 1.2, false));

    let mut lp = Loop::new();
    lp.append_commands(&cmds, &PathCfg::default());
    let mut shape = Shape::new();
    shape.add_loop(lp);
    let rebuilt = shape.flush();

    let mut session = FillSession::new();
    let islands = match session.add_shape(&shape) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("cannot fill glyph: {e}");
            return;
        }
    };
    let absorbed = session.bridge_holes();
    let mesh = session.consume(orientation);
    println!(
        "nodes rebuilt={rebuilt} islands={islands} holes={absorbed} V={} T={} area={:.4} aborted={}",
        mesh.vertices.len(),
        mesh.triangles.len(),
        mesh.area(),
        mesh.aborted_islands
    );
}
