//! Small 2D predicates shared by the node graph and the fill engine.
//!
//! - Orientation: `cross`, `orient2d` (positive = counter-clockwise turn).
//! - Offsetting: `perp_right`, `inflate_direction`.
//! - Rings: `ring_signed_area`, `ring_winding`, `point_in_ring`.

use crate::cfg::EDGE_EPS;
use crate::Vec2;

/// 2D cross product (z component of `a × b`).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of triangle `abc`; positive for a CCW turn.
#[inline]
pub fn orient2d(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    cross(b - a, c - a)
}

/// Right-hand perpendicular `(y, -x)`: outward for an edge of a CCW ring.
#[inline]
pub fn perp_right(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    a + (b - a) * t
}

#[inline]
pub fn approx_eq(a: Vec2, b: Vec2, eps: f64) -> bool {
    (a - b).norm_squared() <= eps * eps
}

fn unit_or_none(v: Vec2) -> Option<Vec2> {
    let n = v.norm();
    (n > EDGE_EPS && n.is_finite()).then(|| v / n)
}

/// Offset direction at `b` for the polyline `a → b → c`.
///
/// The direction is the average of the unit right-hand perpendiculars of
/// `ab` and `bc`, rescaled so that its projection on either edge normal is
/// exactly one: moving `b` by `amount * dir` offsets both adjacent edges by
/// `amount`. A degenerate edge falls back to the other edge's perpendicular;
/// two degenerate edges (or a full reversal) yield the single usable normal
/// or zero.
pub fn inflate_direction(a: Vec2, b: Vec2, c: Vec2) -> Vec2 {
    let n1 = unit_or_none(b - a).map(perp_right);
    let n2 = unit_or_none(c - b).map(perp_right);
    match (n1, n2) {
        (None, None) => Vec2::zeros(),
        (Some(n), None) | (None, Some(n)) => n,
        (Some(n1), Some(n2)) => {
            let avg = (n1 + n2) * 0.5;
            let d = avg.dot(&n1);
            if d <= EDGE_EPS {
                // Edges double back on each other: no finite miter.
                n1
            } else {
                avg / d
            }
        }
    }
}

/// Shoelace signed area of a closed ring (positive = CCW).
pub fn ring_signed_area(points: &[Vec2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for (k, p) in points.iter().enumerate() {
        let q = points[(k + 1) % points.len()];
        acc += cross(*p, q);
    }
    acc * 0.5
}

/// Centroid-relative winding sum `Σ (p−c) × (q−c)` (twice the signed area).
pub fn ring_winding(points: &[Vec2]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let c = points.iter().fold(Vec2::zeros(), |acc, p| acc + p) / points.len() as f64;
    let mut acc = 0.0;
    for (k, p) in points.iter().enumerate() {
        let q = points[(k + 1) % points.len()];
        acc += cross(p - c, q - c);
    }
    acc
}

/// Even-odd containment of `p` in a closed ring (boundary undefined).
pub fn point_in_ring(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let a = points[i];
        let b = points[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Proper or touching intersection test for segments `ab` and `cd`.
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2, eps: f64) -> bool {
    let o1 = orient2d(a, b, c);
    let o2 = orient2d(a, b, d);
    let o3 = orient2d(c, d, a);
    let o4 = orient2d(c, d, b);
    if o1.abs() <= eps && on_segment_box(a, c, b, eps) {
        return true;
    }
    if o2.abs() <= eps && on_segment_box(a, d, b, eps) {
        return true;
    }
    if o3.abs() <= eps && on_segment_box(c, a, d, eps) {
        return true;
    }
    if o4.abs() <= eps && on_segment_box(c, b, d, eps) {
        return true;
    }
    let ab = (o1 > eps && o2 < -eps) || (o1 < -eps && o2 > eps);
    let cd = (o3 > eps && o4 < -eps) || (o3 < -eps && o4 > eps);
    ab && cd
}

#[inline]
fn on_segment_box(a: Vec2, p: Vec2, b: Vec2, eps: f64) -> bool {
    p.x >= a.x.min(b.x) - eps
        && p.x <= a.x.max(b.x) + eps
        && p.y >= a.y.min(b.y) - eps
        && p.y <= a.y.max(b.y) + eps
}
