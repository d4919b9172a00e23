use super::graph::Loop;
use super::node::{Continuity, NodeKey};
use super::PathError;
use crate::cfg::{PARAM_EPS, TANGENT_EPS};
use crate::curve::Bridge;
use crate::geom::{inflate_direction, lerp};
use crate::Vec2;

impl Loop {
    /// Insert a node on `key`'s bridge at parameter `t ∈ (0, 1)`.
    ///
    /// Curves are split with de Casteljau, so the two new bridges trace the
    /// original geometry. Neighbour tangents are written verbatim and their
    /// continuity relaxed where the split breaks it. Returns the new node.
    pub fn subdivide(&mut self, key: NodeKey, t: f64) -> Result<NodeKey, PathError> {
        if !(t > PARAM_EPS && t < 1.0 - PARAM_EPS) {
            return Err(PathError::InvalidParameter { name: "t", value: t });
        }
        let next = self.get(key)?.next.ok_or(PathError::NoSuccessor(key))?;
        let bridge = self.bridge(key)?;
        let mid = match bridge {
            Bridge::None => return Err(PathError::NoSuccessor(key)),
            Bridge::Line(a, b) => self.add_node(lerp(a, b, t)),
            Bridge::Curve(c) => {
                let (l, r) = c.split(t);
                let mid = self.add_node(l.p3);
                self.write_tangents(key, None, Some(l.p1 - l.p0))?;
                self.write_tangents(next, Some(r.p2 - r.p3), None)?;
                let tin = l.p2 - l.p3;
                let tout = r.p1 - r.p0;
                let m = self.get_mut(mid)?;
                m.tangent_in = tin;
                m.tangent_out = tout;
                m.use_tangent_in = true;
                m.use_tangent_out = true;
                m.continuity = if tin.norm() > TANGENT_EPS && tout.norm() > TANGENT_EPS {
                    Continuity::Smooth
                } else {
                    Continuity::Disconnected
                };
                mid
            }
        };
        self.link_raw(key, mid);
        self.link_raw(mid, next);
        self.flag_dirty(mid);
        debug_assert!(self.test_validity().is_ok());
        Ok(mid)
    }

    /// Split `key`'s curve between its two same-axis turns, if it has them.
    /// Returns whether a split happened.
    pub fn deinflect(&mut self, key: NodeKey) -> Result<bool, PathError> {
        Ok(self.split_inflection(key)?.is_some())
    }

    fn split_inflection(&mut self, key: NodeKey) -> Result<Option<NodeKey>, PathError> {
        let Bridge::Curve(c) = self.bridge(key)? else {
            return Ok(None);
        };
        let Some(t) = c.inflection_split() else {
            return Ok(None);
        };
        let mid = self.subdivide(key, t)?;
        tracing::debug!(?key, ?mid, t, "deinflected curve");
        Ok(Some(mid))
    }

    /// Deinflect every bridge of the island through `key` until no piece
    /// turns twice on either axis. Returns the number of splits.
    ///
    /// Both halves of a split are checked again: cutting between the two
    /// x-turns can leave a half that still turns twice in y.
    pub fn deinflect_island(&mut self, key: NodeKey) -> Result<usize, PathError> {
        let island = self.island_of(key)?;
        let mut pending: Vec<NodeKey> = self.chain(island.start).collect();
        let mut splits = 0;
        while let Some(k) = pending.pop() {
            if let Some(mid) = self.split_inflection(k)? {
                splits += 1;
                pending.push(k);
                pending.push(mid);
            }
        }
        Ok(splits)
    }

    /// Existing node at `t` on `key`'s bridge, subdividing when `t` is interior.
    fn node_at(&mut self, key: NodeKey, t: f64) -> Result<NodeKey, PathError> {
        if t <= PARAM_EPS {
            return Ok(key);
        }
        let next = self.get(key)?.next.ok_or(PathError::NoSuccessor(key))?;
        if t >= 1.0 - PARAM_EPS {
            return Ok(next);
        }
        self.subdivide(key, t)
    }

    /// Join two islands with a zero-width seam between `(in_key, in_t)` and
    /// `(out_key, out_t)`.
    ///
    /// Both bridge points `A` and `B` are duplicated into `A'` and `B'`; the
    /// result traverses `… → A → B → … → B' → A' → …`, so the two seam
    /// edges `A → B` and `B' → A'` coincide with opposite direction. All four
    /// nodes become corners. Returns `(A, B)`.
    pub fn make_bridge(
        &mut self,
        in_key: NodeKey,
        in_t: f64,
        out_key: NodeKey,
        out_t: f64,
    ) -> Result<(NodeKey, NodeKey), PathError> {
        if self.same_island(in_key, out_key)? {
            return Err(PathError::SameIsland);
        }
        let a = self.node_at(in_key, in_t)?;
        let b = self.node_at(out_key, out_t)?;
        let a_next = self.get(a)?.next;
        let b_prev = self.get(b)?.prev;
        let a2 = self.clone_node(a)?;
        let b2 = self.clone_node(b)?;

        // A keeps its incoming side, A' takes the outgoing one.
        let an = self.get_mut(a)?;
        an.use_tangent_out = false;
        an.continuity = Continuity::Disconnected;
        let a2n = self.get_mut(a2)?;
        a2n.use_tangent_in = false;
        a2n.continuity = Continuity::Disconnected;
        // B keeps its outgoing side, B' takes the incoming one.
        let bn = self.get_mut(b)?;
        bn.use_tangent_in = false;
        bn.continuity = Continuity::Disconnected;
        let b2n = self.get_mut(b2)?;
        b2n.use_tangent_out = false;
        b2n.continuity = Continuity::Disconnected;

        if let Some(n) = a_next {
            self.get_mut(a)?.next = None;
            self.get_mut(n)?.prev = None;
        }
        if let Some(p) = b_prev {
            self.get_mut(p)?.next = None;
            self.get_mut(b)?.prev = None;
        }
        self.link_raw(a, b);
        if let Some(p) = b_prev {
            self.link_raw(p, b2);
        }
        self.link_raw(b2, a2);
        if let Some(n) = a_next {
            self.link_raw(a2, n);
        }
        for k in [a, b, a2, b2] {
            self.flag_dirty(k);
        }
        debug_assert!(self.test_validity().is_ok());
        tracing::debug!(?a, ?b, ?a2, ?b2, "bridged islands");
        Ok((a, b))
    }

    /// Offset every node of the island through `key` by `amount` along its
    /// miter direction; positive grows the enclosed area. Tangents are kept.
    pub fn inflate_island(&mut self, key: NodeKey, amount: f64) -> Result<(), PathError> {
        let island = self.island_of(key)?;
        let keys: Vec<NodeKey> = self.chain(island.start).collect();
        let positions: Vec<Vec2> = keys
            .iter()
            .map(|k| self.get(*k).map(|n| n.position))
            .collect::<Result<_, _>>()?;
        let n = positions.len();
        if n < 2 {
            return Ok(());
        }
        let sign = if island.cyclical && self.island_winding(key)? < 0.0 {
            -1.0
        } else {
            1.0
        };
        let moved: Vec<Vec2> = (0..n)
            .map(|i| {
                let here = positions[i];
                let prev = match (i, island.cyclical) {
                    (0, true) => positions[n - 1],
                    (0, false) => here,
                    _ => positions[i - 1],
                };
                let next = match (i + 1 == n, island.cyclical) {
                    (true, true) => positions[0],
                    (true, false) => here,
                    _ => positions[i + 1],
                };
                here + inflate_direction(prev, here, next) * (amount * sign)
            })
            .collect();
        for (k, p) in keys.into_iter().zip(moved) {
            self.set_position(k, p)?;
        }
        Ok(())
    }
}
