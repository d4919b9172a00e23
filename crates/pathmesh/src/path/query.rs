use super::graph::Loop;
use super::node::NodeKey;
use super::sample::Sample;
use super::PathError;
use crate::bounds::Bounds2;
use crate::cfg::{PARAM_EPS, TANGENT_EPS};
use crate::curve::{Axis, Bridge, BridgeKind, ClosestPoint, CubicBez, LineExtent, LineHit};
use crate::geom::{cross, lerp, ring_winding};
use crate::Vec2;

impl Loop {
    /// Geometry between `key` and its successor, rebuilt from current state.
    ///
    /// A curve needs at least one effective tangent at either end; two
    /// disabled or zero tangents give a straight line.
    pub fn bridge(&self, key: NodeKey) -> Result<Bridge, PathError> {
        let n = self.get(key)?;
        let Some(next) = n.next else {
            return Ok(Bridge::None);
        };
        let m = self.get(next)?;
        let tout = n.effective_tangent_out();
        let tin = m.effective_tangent_in();
        if tout.norm() <= TANGENT_EPS && tin.norm() <= TANGENT_EPS {
            return Ok(Bridge::Line(n.position, m.position));
        }
        Ok(Bridge::Curve(CubicBez::new(
            n.position,
            n.position + tout,
            m.position + tin,
            m.position,
        )))
    }

    pub fn bridge_kind(&self, key: NodeKey) -> Result<BridgeKind, PathError> {
        Ok(self.bridge(key)?.kind())
    }

    /// Position on `key`'s bridge at `t`; a terminator yields its own position.
    pub fn position_at(&self, key: NodeKey, t: f64) -> Result<Vec2, PathError> {
        let pos = self.get(key)?.position;
        Ok(self.bridge(key)?.eval(t).unwrap_or(pos))
    }

    /// Tight bounds of `key`'s bridge; `Bounds2::EMPTY` for a terminator.
    pub fn bridge_bounds(&self, key: NodeKey) -> Result<Bounds2, PathError> {
        self.get(key)?;
        Ok(self.bridge(key)?.bounds())
    }

    /// Tight bounds of the island through `key`. A lone node gives its
    /// own position.
    pub fn island_bounds(&self, key: NodeKey) -> Result<Bounds2, PathError> {
        let island = self.island_of(key)?;
        let mut b = Bounds2::EMPTY;
        for k in self.chain(island.start) {
            b = b
                .union(self.bridge_bounds(k)?)
                .include(self.get(k)?.position);
        }
        Ok(b)
    }

    /// Polyline length of `key`'s bridge using the cached samples.
    pub fn arc_length_sampled(&self, key: NodeKey) -> Result<f64, PathError> {
        self.ensure_flushed()?;
        let n = self.get(key)?;
        let Some(next) = n.next else {
            return Ok(0.0);
        };
        let end = self.get(next)?.position;
        let mut acc = 0.0;
        let mut prev = n.position;
        for s in n.samples.iter().skip(1) {
            acc += (s.position - prev).norm();
            prev = s.position;
        }
        acc += (end - prev).norm();
        Ok(acc)
    }

    /// Bridge length by uniform stepping with `steps` intervals.
    pub fn arc_length(&self, key: NodeKey, steps: usize) -> Result<f64, PathError> {
        Ok(self.bridge(key)?.arc_length(steps))
    }

    /// Closest point of `key`'s bridge to `p`; `None` for a terminator.
    pub fn closest_point(&self, key: NodeKey, p: Vec2) -> Result<Option<ClosestPoint>, PathError> {
        Ok(self.bridge(key)?.closest_point(p))
    }

    /// Rightmost (or topmost, per `axis`) point of `key`'s bridge.
    pub fn max_on_axis(&self, key: NodeKey, axis: Axis) -> Result<(f64, Vec2), PathError> {
        self.extreme_on_axis(key, axis, true)
    }

    pub fn min_on_axis(&self, key: NodeKey, axis: Axis) -> Result<(f64, Vec2), PathError> {
        self.extreme_on_axis(key, axis, false)
    }

    fn extreme_on_axis(
        &self,
        key: NodeKey,
        axis: Axis,
        maximize: bool,
    ) -> Result<(f64, Vec2), PathError> {
        let pos = self.get(key)?.position;
        Ok(self
            .bridge(key)?
            .extreme_on_axis(axis, maximize)
            .unwrap_or((0.0, pos)))
    }

    /// Node and bridge extreme over the whole island on `axis`.
    pub fn island_extreme(
        &self,
        key: NodeKey,
        axis: Axis,
        maximize: bool,
    ) -> Result<(NodeKey, f64, Vec2), PathError> {
        let island = self.island_of(key)?;
        let mut best: Option<(NodeKey, f64, Vec2)> = None;
        for k in self.chain(island.start) {
            let (t, p) = self.extreme_on_axis(k, axis, maximize)?;
            let better = match best {
                None => true,
                Some((_, _, q)) if maximize => axis.of(p) > axis.of(q),
                Some((_, _, q)) => axis.of(p) < axis.of(q),
            };
            if better {
                best = Some((k, t, p));
            }
        }
        best.ok_or(PathError::UnknownNode(key))
    }

    /// Intersections of `key`'s bridge with `origin + s * dir`, sorted by `s`.
    pub fn intersect_line(
        &self,
        key: NodeKey,
        origin: Vec2,
        dir: Vec2,
        extent: LineExtent,
    ) -> Result<Vec<LineHit>, PathError> {
        Ok(self.bridge(key)?.intersect_line(origin, dir, extent))
    }

    /// Intersections of the whole island with a query line, as
    /// `(node, hit)` pairs sorted by `s`.
    pub fn intersect_island(
        &self,
        key: NodeKey,
        origin: Vec2,
        dir: Vec2,
        extent: LineExtent,
    ) -> Result<Vec<(NodeKey, LineHit)>, PathError> {
        let island = self.island_of(key)?;
        let mut hits = Vec::new();
        for k in self.chain(island.start) {
            for h in self.intersect_line(k, origin, dir, extent)? {
                // Hits at t = 1 belong to the successor's t = 0.
                if h.t < 1.0 - PARAM_EPS || self.get(k)?.next.is_none() {
                    hits.push((k, h));
                }
            }
        }
        hits.sort_by(|a, b| a.1.s.partial_cmp(&b.1.s).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits)
    }

    // ---- winding --------------------------------------------------------

    /// Turn sign at `key`: cross product of the incoming and outgoing chords.
    /// Zero for chain ends and collinear triples.
    pub fn winding_local(&self, key: NodeKey) -> Result<f64, PathError> {
        let n = self.get(key)?;
        let (Some(p), Some(m)) = (n.prev, n.next) else {
            return Ok(0.0);
        };
        let a = self.get(p)?.position;
        let c = self.get(m)?.position;
        Ok(cross(n.position - a, c - n.position))
    }

    /// Signed area swept by `key`'s bridge relative to `centroid`.
    pub fn winding_area(&self, key: NodeKey, centroid: Vec2) -> Result<f64, PathError> {
        Ok(self.bridge(key)?.signed_area(centroid))
    }

    /// Mean node position of the island through `key`.
    pub fn island_centroid(&self, key: NodeKey) -> Result<Vec2, PathError> {
        let island = self.island_of(key)?;
        let mut acc = Vec2::zeros();
        let mut count = 0usize;
        for k in self.chain(island.start) {
            acc += self.get(k)?.position;
            count += 1;
        }
        Ok(if count > 0 { acc / count as f64 } else { acc })
    }

    /// Exact signed area of the island (positive = CCW). Open chains are
    /// closed implicitly by their end-to-start chord.
    pub fn island_winding(&self, key: NodeKey) -> Result<f64, PathError> {
        let island = self.island_of(key)?;
        let centroid = self.island_centroid(key)?;
        let mut acc = 0.0;
        let mut last = island.start;
        for k in self.chain(island.start) {
            acc += self.winding_area(k, centroid)?;
            last = k;
        }
        if !island.cyclical {
            let a = self.get(last)?.position - centroid;
            let b = self.get(island.start)?.position - centroid;
            acc += 0.5 * cross(a, b);
        }
        Ok(acc)
    }

    /// Sample-polyline winding of the island (twice its flattened area).
    pub fn island_sample_winding(&self, key: NodeKey) -> Result<f64, PathError> {
        Ok(ring_winding(&self.island_polyline(key)?))
    }

    /// Winding number of the cyclical island through `start` around `point`,
    /// from signed crossings of the `+x` ray.
    ///
    /// Crossings use the half-open rule: a piece counts when exactly one of
    /// its ends lies strictly above `point.y`. A ray through a vertex or
    /// along a horizontal edge is therefore counted once or not at all.
    pub fn winding_number(&self, start: NodeKey, point: Vec2) -> Result<i32, PathError> {
        self.require_cyclical(start)?;
        let mut winding = 0i32;
        for k in self.chain(start) {
            winding += ray_crossings(&self.bridge(k)?, point);
        }
        Ok(winding)
    }

    // ---- samples ----------------------------------------------------------

    /// Cached samples of `key`'s outgoing bridge.
    pub fn samples(&self, key: NodeKey) -> Result<&[Sample], PathError> {
        self.ensure_flushed()?;
        Ok(&self.get(key)?.samples)
    }

    /// Samples of the island through `key`, in chain order.
    pub fn island_samples(&self, key: NodeKey) -> Result<Vec<Sample>, PathError> {
        self.ensure_flushed()?;
        let island = self.island_of(key)?;
        let mut out = Vec::new();
        for k in self.chain(island.start) {
            out.extend_from_slice(&self.get(k)?.samples);
        }
        Ok(out)
    }

    /// Flattened positions of the island through `key`. A cyclical island
    /// yields a ring without the closing duplicate; an open one ends at its
    /// last node.
    pub fn island_polyline(&self, key: NodeKey) -> Result<Vec<Vec2>, PathError> {
        Ok(self
            .island_samples(key)?
            .into_iter()
            .map(|s| s.position)
            .collect())
    }

    /// Sample following `(key, index)` along the island, wrapping across
    /// node boundaries.
    pub fn next_sample(&self, key: NodeKey, index: usize) -> Result<Option<Sample>, PathError> {
        self.ensure_flushed()?;
        let n = self.get(key)?;
        if let Some(s) = n.samples.get(index + 1) {
            return Ok(Some(*s));
        }
        match n.next {
            Some(m) => Ok(self.get(m)?.samples.first().copied()),
            None => Ok(None),
        }
    }

    /// Sample preceding `(key, index)` along the island.
    pub fn prev_sample(&self, key: NodeKey, index: usize) -> Result<Option<Sample>, PathError> {
        self.ensure_flushed()?;
        let n = self.get(key)?;
        if index > 0 {
            return Ok(n.samples.get(index - 1).copied());
        }
        match n.prev {
            Some(p) => Ok(self.get(p)?.samples.last().copied()),
            None => Ok(None),
        }
    }
}

/// Signed crossings of the `+x` ray from `p` with one bridge.
fn ray_crossings(bridge: &Bridge, p: Vec2) -> i32 {
    match *bridge {
        Bridge::None => 0,
        Bridge::Line(a, b) => crossing(a, b, p, |y| lerp(a, b, (y - a.y) / (b.y - a.y))),
        Bridge::Curve(c) => {
            // y-monotone pieces; shared ends are evaluated once so neighbouring
            // pieces agree on which side of the ray they sit.
            let mut ts = vec![0.0];
            let mut turns = c.interior_turns(Axis::Y);
            turns.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
            ts.extend(turns);
            ts.push(1.0);
            let ends: Vec<Vec2> = ts.iter().map(|t| c.eval(*t)).collect();
            ts.windows(2)
                .zip(ends.windows(2))
                .map(|(t, q)| {
                    let rising = q[1].y > q[0].y;
                    crossing(q[0], q[1], p, |y| {
                        let (mut lo, mut hi) = (t[0], t[1]);
                        for _ in 0..64 {
                            let mid = 0.5 * (lo + hi);
                            if (c.eval(mid).y <= y) == rising {
                                lo = mid;
                            } else {
                                hi = mid;
                            }
                        }
                        c.eval(0.5 * (lo + hi))
                    })
                })
                .sum()
        }
    }
}

/// Half-open crossing of a y-monotone piece `a → b` with the `+x` ray from
/// `p`. `at_y` returns the piece's point at a given height.
fn crossing(a: Vec2, b: Vec2, p: Vec2, at_y: impl Fn(f64) -> Vec2) -> i32 {
    if (a.y <= p.y) == (b.y <= p.y) {
        return 0;
    }
    if at_y(p.y).x <= p.x {
        return 0;
    }
    if b.y > a.y {
        1
    } else {
        -1
    }
}
