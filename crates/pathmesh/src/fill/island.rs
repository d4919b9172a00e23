use slotmap::{new_key_type, Key, SecondaryMap, SlotMap};

use super::RingError;
use crate::cfg::TessCfg;
use crate::geom::{approx_eq, inflate_direction, ring_winding, segments_intersect};
use crate::Vec2;

new_key_type! {
    /// Handle of one ring vertex inside its `FillIsland`.
    pub struct SegKey;
}

/// Ring vertex with its neighbours.
#[derive(Clone, Copy, Debug)]
pub struct FillSegment {
    pub position: Vec2,
    pub(crate) next: SegKey,
    pub(crate) prev: SegKey,
}

impl FillSegment {
    #[inline]
    pub fn next(&self) -> SegKey {
        self.next
    }
    #[inline]
    pub fn prev(&self) -> SegKey {
        self.prev
    }
}

/// Closed ring of positions, consumed by ear clipping.
///
/// The winding (twice the signed area, positive = CCW) is computed when the
/// ring is built and kept until the ring is restructured.
#[derive(Debug, Default)]
pub struct FillIsland {
    pub(crate) segs: SlotMap<SegKey, FillSegment>,
    pub(crate) head: Option<SegKey>,
    pub(crate) winding: f64,
}

impl Clone for FillIsland {
    /// Deep copy with fresh keys; links are remapped onto the copy.
    fn clone(&self) -> Self {
        let mut segs = SlotMap::with_capacity_and_key(self.segs.len());
        let mut remap: SecondaryMap<SegKey, SegKey> = SecondaryMap::new();
        for (k, s) in self.segs.iter() {
            remap.insert(k, segs.insert(*s));
        }
        for (_, s) in segs.iter_mut() {
            s.next = remap.get(s.next).copied().unwrap_or_default();
            s.prev = remap.get(s.prev).copied().unwrap_or_default();
        }
        Self {
            segs,
            head: self.head.and_then(|h| remap.get(h).copied()),
            winding: self.winding,
        }
    }
}

/// Drop consecutive duplicates (including the wrap-around pair).
pub(crate) fn dedup_ring(points: &[Vec2], eps: f64) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |q| !approx_eq(*q, *p, eps)) {
            out.push(*p);
        }
    }
    while out.len() > 1 && approx_eq(out[0], out[out.len() - 1], eps) {
        out.pop();
    }
    out
}

/// Miter offset directions of a polyline; closed rings wrap around.
fn offset_dirs(points: &[Vec2], closed: bool) -> Vec<Vec2> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let here = points[i];
            let prev = if i > 0 {
                points[i - 1]
            } else if closed {
                points[n - 1]
            } else {
                here
            };
            let next = if i + 1 < n {
                points[i + 1]
            } else if closed {
                points[0]
            } else {
                here
            };
            inflate_direction(prev, here, next)
        })
        .collect()
}

impl FillIsland {
    /// Closed ring through `points` in order. Fewer than one point gives an
    /// empty island.
    pub fn create_looped(points: &[Vec2]) -> Self {
        let mut island = Self::default();
        let keys: Vec<SegKey> = points
            .iter()
            .map(|p| {
                island.segs.insert(FillSegment {
                    position: *p,
                    next: SegKey::null(),
                    prev: SegKey::null(),
                })
            })
            .collect();
        let n = keys.len();
        for i in 0..n {
            let next = keys[(i + 1) % n];
            let prev = keys[(i + n - 1) % n];
            if let Some(s) = island.segs.get_mut(keys[i]) {
                s.next = next;
                s.prev = prev;
            }
        }
        island.head = keys.first().copied();
        island.winding = ring_winding(points);
        island
    }

    /// Stroke band around an open polyline: the polyline offset by
    /// `push_out` walked forward, then offset by `push_in` walked back.
    /// Offsets follow the right-hand side of travel.
    pub fn create_edged(points: &[Vec2], push_in: f64, push_out: f64) -> Self {
        if points.len() < 2 {
            return Self::default();
        }
        let dirs = offset_dirs(points, false);
        let mut ring: Vec<Vec2> = points
            .iter()
            .zip(&dirs)
            .map(|(p, d)| p + d * push_out)
            .collect();
        ring.extend(
            points
                .iter()
                .zip(&dirs)
                .rev()
                .map(|(p, d)| p + d * push_in),
        );
        Self::create_looped(&ring)
    }

    /// Band between two offsets of a closed ring, joined by a zero-width
    /// seam at the first point. Positive offsets point away from the
    /// enclosed area regardless of the ring's orientation.
    ///
    /// Ring order: `o0 … o(n-1), o0', i0, i(n-1) … i1, i0'`.
    pub fn create_banded(points: &[Vec2], push_in: f64, push_out: f64) -> Self {
        let n = points.len();
        if n < 2 {
            return Self::default();
        }
        let sign = if ring_winding(points) < 0.0 { -1.0 } else { 1.0 };
        let dirs = offset_dirs(points, true);
        let outer: Vec<Vec2> = points
            .iter()
            .zip(&dirs)
            .map(|(p, d)| p + d * (push_out * sign))
            .collect();
        let inner: Vec<Vec2> = points
            .iter()
            .zip(&dirs)
            .map(|(p, d)| p + d * (push_in * sign))
            .collect();
        let mut ring = Vec::with_capacity(2 * n + 2);
        ring.extend_from_slice(&outer);
        ring.push(outer[0]);
        ring.push(inner[0]);
        ring.extend(inner[1..].iter().rev());
        ring.push(inner[0]);
        Self::create_looped(&ring)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    /// Cached winding (twice the signed area; positive = CCW).
    #[inline]
    pub fn winding(&self) -> f64 {
        self.winding
    }

    #[inline]
    pub fn head(&self) -> Option<SegKey> {
        self.head
    }

    #[inline]
    pub fn segment(&self, key: SegKey) -> Option<&FillSegment> {
        self.segs.get(key)
    }

    /// Keys in ring order from the head.
    pub fn ring_keys(&self) -> Vec<SegKey> {
        let mut out = Vec::with_capacity(self.segs.len());
        let Some(head) = self.head else {
            return out;
        };
        let mut cur = head;
        for _ in 0..self.segs.len() {
            out.push(cur);
            match self.segs.get(cur) {
                Some(s) if s.next != head => cur = s.next,
                _ => break,
            }
        }
        out
    }

    /// Positions in ring order from the head.
    pub fn points(&self) -> Vec<Vec2> {
        self.ring_keys()
            .into_iter()
            .filter_map(|k| self.segs.get(k).map(|s| s.position))
            .collect()
    }

    /// Recompute the cached winding from the current ring.
    pub(crate) fn refresh_winding(&mut self) {
        self.winding = ring_winding(&self.points());
    }

    /// O(n) structural check: live links, mirrored links, one full cycle.
    pub fn test_validity(&self) -> Result<(), RingError> {
        if self.segs.is_empty() {
            return Ok(());
        }
        let head = self.head.ok_or(RingError::MissingHead)?;
        if !self.segs.contains_key(head) {
            return Err(RingError::MissingHead);
        }
        for (k, s) in self.segs.iter() {
            let next = self.segs.get(s.next).ok_or(RingError::DanglingLink(k))?;
            if next.prev != k {
                return Err(RingError::AsymmetricLink { from: k, to: s.next });
            }
            if !self.segs.contains_key(s.prev) {
                return Err(RingError::DanglingLink(k));
            }
        }
        let walked = self.ring_keys().len();
        if walked != self.segs.len() {
            return Err(RingError::CountMismatch {
                stored: self.segs.len(),
                walked,
            });
        }
        Ok(())
    }

    /// Reverse the traversal direction.
    pub fn reverse(&mut self) {
        for (_, s) in self.segs.iter_mut() {
            std::mem::swap(&mut s.next, &mut s.prev);
        }
        self.winding = -self.winding;
    }

    /// Offset every vertex along its miter direction; positive grows the
    /// enclosed area.
    pub fn inflate(&mut self, amount: f64) {
        let keys = self.ring_keys();
        let points = self.points();
        let sign = if self.winding < 0.0 { -1.0 } else { 1.0 };
        let dirs = offset_dirs(&points, true);
        for ((k, p), d) in keys.into_iter().zip(points).zip(dirs) {
            if let Some(s) = self.segs.get_mut(k) {
                s.position = p + d * (amount * sign);
            }
        }
        self.refresh_winding();
    }

    /// Replace the ring by a hollow outline of `width`: the ring itself is
    /// the inner edge, its outward offset the outer edge, joined by a seam.
    /// A zero width yields a degenerate ring enclosing no area.
    pub fn make_outline_bridged(&mut self, width: f64) {
        let points = self.points();
        *self = Self::create_banded(&points, 0.0, width);
    }

    /// Splice `hole` into this ring through a zero-width seam from the
    /// hole's leftmost vertex to a visible vertex of this ring.
    ///
    /// The hole is reversed first if it winds the same way as this ring.
    /// Returns the hole back when no visible bridge vertex exists.
    pub fn absorb_hole(&mut self, mut hole: FillIsland, cfg: &TessCfg) -> Result<(), FillIsland> {
        if hole.is_empty() || self.is_empty() {
            return Err(hole);
        }
        if hole.winding.signum() == self.winding.signum() {
            hole.reverse();
        }
        let Some(h_src) = hole.leftmost() else {
            return Err(hole);
        };
        let hole_p = hole.segs[h_src].position;
        let Some(o) = self.find_hole_bridge(hole_p, cfg) else {
            return Err(hole);
        };

        let mut remap: SecondaryMap<SegKey, SegKey> = SecondaryMap::new();
        for (k, s) in hole.segs.iter() {
            remap.insert(k, self.segs.insert(*s));
        }
        for (_, &new) in remap.iter() {
            let s = self.segs[new];
            let next = remap.get(s.next).copied().unwrap_or_default();
            let prev = remap.get(s.prev).copied().unwrap_or_default();
            let s = &mut self.segs[new];
            s.next = next;
            s.prev = prev;
        }
        let Some(&h) = remap.get(h_src) else {
            return Ok(());
        };

        let o_next = self.segs[o].next;
        let h_prev = self.segs[h].prev;
        let o2 = self.segs.insert(self.segs[o]);
        let h2 = self.segs.insert(self.segs[h]);
        self.segs[o].next = h;
        self.segs[h].prev = o;
        self.segs[h_prev].next = h2;
        self.segs[h2].prev = h_prev;
        self.segs[h2].next = o2;
        self.segs[o2].prev = h2;
        self.segs[o2].next = o_next;
        self.segs[o_next].prev = o2;

        self.refresh_winding();
        debug_assert!(self.test_validity().is_ok());
        tracing::trace!(
            hole_len = hole.len(),
            ring_len = self.len(),
            "absorbed hole into ring"
        );
        Ok(())
    }

    /// Vertex with the smallest x (ties: smallest y).
    pub(crate) fn leftmost(&self) -> Option<SegKey> {
        self.segs
            .iter()
            .min_by(|(_, a), (_, b)| {
                (a.position.x, a.position.y)
                    .partial_cmp(&(b.position.x, b.position.y))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(k, _)| k)
    }

    /// Nearest edge to the left of `p` along its horizontal; prefer that
    /// edge's left endpoint, then any visible vertex left of `p`.
    fn find_hole_bridge(&self, p: Vec2, cfg: &TessCfg) -> Option<SegKey> {
        let mut best_x = f64::NEG_INFINITY;
        let mut best_edge = None;
        for (k, s) in self.segs.iter() {
            let a = s.position;
            let b = self.segs.get(s.next)?.position;
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if x <= p.x + cfg.eps_coincident && x > best_x {
                    best_x = x;
                    best_edge = Some((k, s.next));
                }
            }
        }
        let (e0, e1) = best_edge?;
        let candidates = if self.segs[e0].position.x < self.segs[e1].position.x {
            [e0, e1]
        } else {
            [e1, e0]
        };
        for cand in candidates {
            if self.is_visible(p, cand, cfg) {
                return Some(cand);
            }
        }
        let mut best = None;
        let mut best_d2 = f64::INFINITY;
        for (k, s) in self.segs.iter() {
            let q = s.position;
            if q.x <= p.x + cfg.eps_coincident && self.is_visible(p, k, cfg) {
                let d2 = (q - p).norm_squared();
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = Some(k);
                }
            }
        }
        best
    }

    /// Whether segment `p → target` crosses no ring edge, ignoring edges
    /// that touch the target position.
    fn is_visible(&self, p: Vec2, target: SegKey, cfg: &TessCfg) -> bool {
        let t = self.segs[target].position;
        self.segs.iter().all(|(_, s)| {
            let Some(n) = self.segs.get(s.next) else {
                return true;
            };
            let (c, d) = (s.position, n.position);
            if approx_eq(c, t, cfg.eps_coincident) || approx_eq(d, t, cfg.eps_coincident) {
                return true;
            }
            !segments_intersect(p, t, c, d, cfg.eps_edge)
        })
    }
}
