//! Cubic Bezier maths and bridge classification.
//!
//! A *bridge* is the connection between a node and its successor: nothing
//! (chain end), a straight line, or a cubic Bezier. `Bridge` carries the
//! control points so every query can be answered without touching the node
//! graph; the graph rebuilds it from current node state on each call.
//!
//! References
//! - Code cross-refs: `path::Loop::bridge`, `roots::{solve_quadratic, solve_cubic}`

use crate::bounds::Bounds2;
use crate::cfg::{CLOSEST_COARSE_STEPS, CLOSEST_REFINE_ITERS, PARAM_EPS};
use crate::geom::{cross, lerp};
use crate::roots::{in_unit_interval, solve_cubic, solve_quadratic};
use crate::Vec2;

/// Coordinate axis selector for extent queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    pub fn of(self, p: Vec2) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// How far a query line extends past its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineExtent {
    /// `origin + s * dir` for `s >= 0`.
    Ray,
    /// `origin + s * dir` for `0 <= s <= 1`.
    Segment,
}

impl LineExtent {
    #[inline]
    fn admits(self, s: f64) -> bool {
        match self {
            LineExtent::Ray => s >= -PARAM_EPS,
            LineExtent::Segment => (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&s),
        }
    }
}

/// Intersection of a query line with a bridge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineHit {
    /// Parameter on the bridge, in `[0, 1]`.
    pub t: f64,
    /// Parameter on the query line (`origin + s * dir`).
    pub s: f64,
    pub point: Vec2,
}

/// Approximate closest point on a bridge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosestPoint {
    pub t: f64,
    pub point: Vec2,
    pub distance: f64,
}

/// Cubic Bezier with control points `p0..p3`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBez {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl CubicBez {
    #[inline]
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight segment expressed as a cubic (handles at thirds).
    pub fn from_line(a: Vec2, b: Vec2) -> Self {
        Self::new(a, lerp(a, b, 1.0 / 3.0), lerp(a, b, 2.0 / 3.0), b)
    }

    /// Point at `t` from the Bernstein weights.
    #[inline]
    pub fn eval(&self, t: f64) -> Vec2 {
        let u = 1.0 - t;
        let w0 = u * u * u;
        let w1 = 3.0 * u * u * t;
        let w2 = 3.0 * u * t * t;
        let w3 = t * t * t;
        self.p0 * w0 + self.p1 * w1 + self.p2 * w2 + self.p3 * w3
    }

    /// First derivative at `t`.
    #[inline]
    pub fn deriv(&self, t: f64) -> Vec2 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Power-basis coefficients `[d, c, b, a]` with `B(t) = a t³ + b t² + c t + d`.
    pub fn power_coeffs(&self) -> [Vec2; 4] {
        let d = self.p0;
        let c = (self.p1 - self.p0) * 3.0;
        let b = (self.p2 - self.p1 * 2.0 + self.p0) * 3.0;
        let a = self.p3 - self.p2 * 3.0 + self.p1 * 3.0 - self.p0;
        [d, c, b, a]
    }

    /// de Casteljau split at `t`; both halves reproduce the original exactly.
    pub fn split(&self, t: f64) -> (CubicBez, CubicBez) {
        let q0 = lerp(self.p0, self.p1, t);
        let q1 = lerp(self.p1, self.p2, t);
        let q2 = lerp(self.p2, self.p3, t);
        let r0 = lerp(q0, q1, t);
        let r1 = lerp(q1, q2, t);
        let s = lerp(r0, r1, t);
        (
            CubicBez::new(self.p0, q0, r0, s),
            CubicBez::new(s, r1, q2, self.p3),
        )
    }

    /// Parameters in `[0, 1]` where the derivative on `axis` vanishes.
    pub fn axis_extrema(&self, axis: Axis) -> Vec<f64> {
        let [_, c, b, a] = self.power_coeffs();
        in_unit_interval(
            solve_quadratic(axis.of(c), 2.0 * axis.of(b), 3.0 * axis.of(a)),
            0.0,
        )
    }

    /// Turning parameters on `axis` strictly inside `(0, 1)`.
    pub fn interior_turns(&self, axis: Axis) -> Vec<f64> {
        let [_, c, b, a] = self.power_coeffs();
        solve_quadratic(axis.of(c), 2.0 * axis.of(b), 3.0 * axis.of(a))
            .into_iter()
            .filter(|t| *t > PARAM_EPS && *t < 1.0 - PARAM_EPS)
            .collect()
    }

    /// Parameter at which to split an S-shaped (doubly turning) curve, if any.
    ///
    /// An axis whose 1-D cubic turns twice inside the segment makes the curve
    /// reverse direction twice along that axis; splitting midway between the
    /// two turns leaves pieces that turn at most once.
    pub fn inflection_split(&self) -> Option<f64> {
        for axis in [Axis::X, Axis::Y] {
            let turns = self.interior_turns(axis);
            if turns.len() >= 2 {
                return Some(0.5 * (turns[0] + turns[1]));
            }
        }
        None
    }

    /// Tight bounding box (endpoints plus axis extrema).
    pub fn bounds(&self) -> Bounds2 {
        let mut b = Bounds2::new(self.p0, self.p3);
        for axis in [Axis::X, Axis::Y] {
            for t in self.axis_extrema(axis) {
                b = b.include(self.eval(t));
            }
        }
        b
    }

    /// Signed area between the curve and `origin` (sums to the enclosed
    /// area over a closed path; positive = CCW).
    pub fn signed_area(&self, origin: Vec2) -> f64 {
        let (p0, p1, p2, p3) = (
            self.p0 - origin,
            self.p1 - origin,
            self.p2 - origin,
            self.p3 - origin,
        );
        (p0.x * (6.0 * p1.y + 3.0 * p2.y + p3.y)
            + 3.0 * (p1.x * (-2.0 * p0.y + p2.y + p3.y) - p2.x * (p0.y + p1.y - 2.0 * p3.y))
            - p3.x * (p0.y + 3.0 * p1.y + 6.0 * p2.y))
            * (1.0 / 20.0)
    }
}

/// Classification of a bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeKind {
    None,
    Line,
    BezierCurve,
}

/// Geometry between a node and its successor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bridge {
    None,
    Line(Vec2, Vec2),
    Curve(CubicBez),
}

impl Bridge {
    #[inline]
    pub fn kind(&self) -> BridgeKind {
        match self {
            Bridge::None => BridgeKind::None,
            Bridge::Line(..) => BridgeKind::Line,
            Bridge::Curve(_) => BridgeKind::BezierCurve,
        }
    }

    /// The bridge as a cubic (lines get handles at thirds).
    pub fn as_cubic(&self) -> Option<CubicBez> {
        match *self {
            Bridge::None => None,
            Bridge::Line(a, b) => Some(CubicBez::from_line(a, b)),
            Bridge::Curve(c) => Some(c),
        }
    }

    pub fn eval(&self, t: f64) -> Option<Vec2> {
        match *self {
            Bridge::None => None,
            Bridge::Line(a, b) => Some(lerp(a, b, t)),
            Bridge::Curve(c) => Some(c.eval(t)),
        }
    }

    pub fn endpoints(&self) -> Option<(Vec2, Vec2)> {
        match *self {
            Bridge::None => None,
            Bridge::Line(a, b) => Some((a, b)),
            Bridge::Curve(c) => Some((c.p0, c.p3)),
        }
    }

    /// Tight box; `Bounds2::EMPTY` for `None`.
    pub fn bounds(&self) -> Bounds2 {
        match *self {
            Bridge::None => Bounds2::EMPTY,
            Bridge::Line(a, b) => Bounds2::new(a, b),
            Bridge::Curve(c) => c.bounds(),
        }
    }

    /// Polyline length with `steps` uniform parameter steps (exact for lines).
    pub fn arc_length(&self, steps: usize) -> f64 {
        match *self {
            Bridge::None => 0.0,
            Bridge::Line(a, b) => (b - a).norm(),
            Bridge::Curve(c) => {
                let steps = steps.max(1);
                let mut prev = c.p0;
                let mut acc = 0.0;
                for i in 1..=steps {
                    let p = c.eval(i as f64 / steps as f64);
                    acc += (p - prev).norm();
                    prev = p;
                }
                acc
            }
        }
    }

    /// Approximate closest point: coarse uniform scan, then bisection
    /// between the best sample and its better neighbour.
    pub fn closest_point(&self, p: Vec2) -> Option<ClosestPoint> {
        match *self {
            Bridge::None => None,
            Bridge::Line(a, b) => {
                let e = b - a;
                let len2 = e.norm_squared();
                let t = if len2 > 0.0 {
                    ((p - a).dot(&e) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let point = lerp(a, b, t);
                Some(ClosestPoint {
                    t,
                    point,
                    distance: (p - point).norm(),
                })
            }
            Bridge::Curve(c) => Some(closest_on_cubic(&c, p)),
        }
    }

    /// Extreme parameter/point of the bridge on `axis` (`maximize` picks the side).
    pub fn extreme_on_axis(&self, axis: Axis, maximize: bool) -> Option<(f64, Vec2)> {
        let better = |a: f64, b: f64| if maximize { a > b } else { a < b };
        let (a, b) = self.endpoints()?;
        let mut best = (0.0, a);
        if better(axis.of(b), axis.of(a)) {
            best = (1.0, b);
        }
        if let Bridge::Curve(c) = self {
            for t in c.axis_extrema(axis) {
                let q = c.eval(t);
                if better(axis.of(q), axis.of(best.1)) {
                    best = (t, q);
                }
            }
        }
        Some(best)
    }

    /// Intersections with `origin + s * dir` restricted by `extent`, sorted by `s`.
    ///
    /// A line bridge collinear with the query reports the endpoint nearest
    /// the origin that the extent admits, or nothing.
    pub fn intersect_line(&self, origin: Vec2, dir: Vec2, extent: LineExtent) -> Vec<LineHit> {
        let dd = dir.norm_squared();
        if dd == 0.0 {
            return Vec::new();
        }
        let mut hits = match *self {
            Bridge::None => Vec::new(),
            Bridge::Line(a, b) => intersect_line_segment(a, b, origin, dir, extent),
            Bridge::Curve(c) => intersect_line_cubic(&c, origin, dir, extent),
        };
        hits.sort_by(|x, y| x.s.partial_cmp(&y.s).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }

    /// Exact signed area swept relative to `origin`.
    pub fn signed_area(&self, origin: Vec2) -> f64 {
        match *self {
            Bridge::None => 0.0,
            Bridge::Line(a, b) => 0.5 * cross(a - origin, b - origin),
            Bridge::Curve(c) => c.signed_area(origin),
        }
    }
}

fn closest_on_cubic(c: &CubicBez, p: Vec2) -> ClosestPoint {
    let n = CLOSEST_COARSE_STEPS.max(2);
    let dist2 = |t: f64| (c.eval(t) - p).norm_squared();
    let mut best = 0usize;
    let mut best_d = f64::INFINITY;
    let samples: Vec<f64> = (0..=n).map(|i| dist2(i as f64 / n as f64)).collect();
    for (i, d) in samples.iter().enumerate() {
        if *d < best_d {
            best_d = *d;
            best = i;
        }
    }
    let second = match (best.checked_sub(1), (best < n).then_some(best + 1)) {
        (Some(l), Some(r)) => {
            if samples[l] <= samples[r] {
                l
            } else {
                r
            }
        }
        (Some(l), None) => l,
        (None, Some(r)) => r,
        (None, None) => best,
    };
    let mut lo = best as f64 / n as f64;
    let mut hi = second as f64 / n as f64;
    let mut d_lo = samples[best];
    let mut d_hi = samples[second];
    for _ in 0..CLOSEST_REFINE_ITERS {
        let mid = 0.5 * (lo + hi);
        let d_mid = dist2(mid);
        if d_lo <= d_hi {
            hi = mid;
            d_hi = d_mid;
        } else {
            lo = mid;
            d_lo = d_mid;
        }
    }
    let t = if d_lo <= d_hi { lo } else { hi };
    let point = c.eval(t);
    ClosestPoint {
        t,
        point,
        distance: (point - p).norm(),
    }
}

fn intersect_line_segment(
    a: Vec2,
    b: Vec2,
    origin: Vec2,
    dir: Vec2,
    extent: LineExtent,
) -> Vec<LineHit> {
    let e = b - a;
    let denom = cross(e, dir);
    let scale = e.norm() * dir.norm();
    if denom.abs() <= 1e-12 * scale.max(1e-300) {
        // Parallel: only a collinear bridge can meet the line.
        if cross(a - origin, dir).abs() > 1e-9 * dir.norm() * (1.0 + (a - origin).norm()) {
            return Vec::new();
        }
        let dd = dir.norm_squared();
        let mut best: Option<LineHit> = None;
        for (t, p) in [(0.0, a), (1.0, b)] {
            let s = (p - origin).dot(&dir) / dd;
            if extent.admits(s) && best.map_or(true, |h| s < h.s) {
                best = Some(LineHit { t, s, point: p });
            }
        }
        return best.into_iter().collect();
    }
    let t = cross(origin - a, dir) / denom;
    let s = cross(origin - a, e) / denom;
    if (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&t) && extent.admits(s) {
        let t = t.clamp(0.0, 1.0);
        vec![LineHit {
            t,
            s,
            point: lerp(a, b, t),
        }]
    } else {
        Vec::new()
    }
}

fn intersect_line_cubic(c: &CubicBez, origin: Vec2, dir: Vec2, extent: LineExtent) -> Vec<LineHit> {
    let n = Vec2::new(-dir.y, dir.x);
    let [d, cc, b, a] = c.power_coeffs();
    let coeffs = [n.dot(&(d - origin)), n.dot(&cc), n.dot(&b), n.dot(&a)];
    let size = (c.p3 - c.p0).norm() + (c.p1 - c.p0).norm() + (c.p2 - c.p3).norm();
    if coeffs.iter().all(|k| k.abs() <= 1e-12 * n.norm() * (1.0 + size)) {
        // The whole curve lies on the query line.
        return intersect_line_segment(c.p0, c.p3, origin, dir, extent);
    }
    let dd = dir.norm_squared();
    in_unit_interval(solve_cubic(coeffs[0], coeffs[1], coeffs[2], coeffs[3]), PARAM_EPS)
        .into_iter()
        .filter_map(|t| {
            let point = c.eval(t);
            let s = (point - origin).dot(&dir) / dd;
            extent.admits(s).then_some(LineHit { t, s, point })
        })
        .collect()
}
