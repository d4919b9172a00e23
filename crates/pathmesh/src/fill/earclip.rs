use super::island::{FillIsland, SegKey};
use super::repo::VertexRepo2;
use crate::cfg::TessCfg;
use crate::geom::{approx_eq, orient2d};
use crate::Vec2;

/// Winding of emitted triangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    CounterClockwise,
    Clockwise,
}

impl Orientation {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Orientation::CounterClockwise => 1.0,
            Orientation::Clockwise => -1.0,
        }
    }
}

/// How an ear-clipping pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EarClipOutcome {
    /// The ring was reduced to at most two vertices.
    Complete,
    /// Two full passes found no clippable ear; `remaining` vertices are left.
    Aborted { remaining: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EarClipReport {
    pub triangles: usize,
    pub outcome: EarClipOutcome,
}

#[inline]
fn sign_eps(v: f64, eps: f64) -> i8 {
    if v > eps {
        1
    } else if v < -eps {
        -1
    } else {
        0
    }
}

/// Inside-or-on test that also works for degenerate (flat) triangles.
fn in_triangle(a: Vec2, b: Vec2, c: Vec2, p: Vec2, eps: f64) -> bool {
    let lo = a.inf(&b).inf(&c);
    let hi = a.sup(&b).sup(&c);
    if p.x < lo.x - eps || p.y < lo.y - eps || p.x > hi.x + eps || p.y > hi.y + eps {
        return false;
    }
    let d = [orient2d(a, b, p), orient2d(b, c, p), orient2d(c, a, p)];
    let has_neg = d.iter().any(|v| *v < -eps);
    let has_pos = d.iter().any(|v| *v > eps);
    !(has_neg && has_pos)
}

impl FillIsland {
    /// Ear-clip the ring into `out`, emitting indices from `repo`.
    ///
    /// The ring is consumed: clipped vertices are removed until two or fewer
    /// remain, or until two consecutive full passes clip nothing. An ear is
    /// clippable when its turn agrees with the ring's overall winding (flat
    /// counts as agreeing only for a flat ring) and no reflex or flat ring
    /// vertex lies inside or on it. The last triangle is always emitted.
    /// Every triangle is written in `orientation`.
    pub fn consume_into_triangles(
        &mut self,
        repo: &mut VertexRepo2,
        out: &mut Vec<[u32; 3]>,
        orientation: Orientation,
        cfg: &TessCfg,
    ) -> EarClipReport {
        debug_assert!(self.test_validity().is_ok());
        let global = sign_eps(self.winding, cfg.eps_area);
        let mut remaining = self.segs.len();
        let mut triangles = 0usize;
        let Some(mut cur) = self.head else {
            return EarClipReport {
                triangles,
                outcome: EarClipOutcome::Complete,
            };
        };
        let mut idle = 0usize;

        while remaining > 2 {
            let s = self.segs[cur];
            let (prev, next) = (s.prev, s.next);
            let a = self.segs[prev].position;
            let b = s.position;
            let c = self.segs[next].position;
            let local = orient2d(a, b, c);
            let clippable = remaining == 3
                || (sign_eps(local, cfg.eps_area) == global
                    && !self.ear_blocked(prev, cur, next, global, cfg));

            if !clippable {
                idle += 1;
                if idle >= 2 * remaining {
                    tracing::debug!(remaining, triangles, "ear clipping found no ear; abandoning ring");
                    return EarClipReport {
                        triangles,
                        outcome: EarClipOutcome::Aborted { remaining },
                    };
                }
                cur = next;
                continue;
            }

            let (ia, ib, ic) = (repo.get_index(a), repo.get_index(b), repo.get_index(c));
            if local * orientation.sign() >= 0.0 {
                out.push([ia, ib, ic]);
            } else {
                out.push([ia, ic, ib]);
            }
            triangles += 1;

            self.segs[prev].next = next;
            self.segs[next].prev = prev;
            self.segs.remove(cur);
            if self.head == Some(cur) {
                self.head = Some(next);
            }
            remaining -= 1;
            idle = 0;
            cur = next;
        }
        debug_assert!(self.test_validity().is_ok());
        EarClipReport {
            triangles,
            outcome: EarClipOutcome::Complete,
        }
    }

    /// A ring vertex other than the ear's corners blocks the ear when it
    /// lies inside or on the triangle and is itself reflex or flat with
    /// respect to the ring winding. Vertices on top of a corner never block.
    fn ear_blocked(&self, prev: SegKey, ear: SegKey, next: SegKey, global: i8, cfg: &TessCfg) -> bool {
        let a = self.segs[prev].position;
        let b = self.segs[ear].position;
        let c = self.segs[next].position;
        let mut p = self.segs[next].next;
        while p != prev {
            let s = self.segs[p];
            let q = s.position;
            let on_corner = approx_eq(q, a, cfg.eps_coincident)
                || approx_eq(q, b, cfg.eps_coincident)
                || approx_eq(q, c, cfg.eps_coincident);
            if !on_corner && in_triangle(a, b, c, q, cfg.eps_edge) {
                let turn = orient2d(self.segs[s.prev].position, q, self.segs[s.next].position);
                if turn * f64::from(global) <= cfg.eps_area {
                    return true;
                }
            }
            p = s.next;
        }
        false
    }
}
