use slotmap::{SecondaryMap, SlotMap};

use super::node::{Continuity, Node, NodeKey, TangentSide};
use super::sample::flatten_bridge;
use super::{PathError, ValidityError};
use crate::cfg::TANGENT_EPS;
use crate::Vec2;

/// End of an open chain, or the marker for a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainKind {
    Open(NodeKey),
    Cyclical,
}

/// One connected chain of nodes inside a `Loop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Island {
    /// First node: the leftmost node of an open chain, any node of a cycle.
    pub start: NodeKey,
    pub cyclical: bool,
    pub len: usize,
}

/// Arena of path nodes forming one or more islands.
#[derive(Clone, Debug, Default)]
pub struct Loop {
    nodes: SlotMap<NodeKey, Node>,
    dirty: bool,
}

/// Walks `next` links from a start node, stopping at the chain end or when
/// the walk returns to the start. Bounded by the arena size, so malformed
/// links (a `rho`-shaped chain) cannot spin forever.
pub struct ChainIter<'a> {
    lp: &'a Loop,
    start: NodeKey,
    cur: Option<NodeKey>,
    budget: usize,
}

impl Iterator for ChainIter<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let cur = self.cur?;
        if self.budget == 0 {
            return None;
        }
        self.budget -= 1;
        self.cur = self
            .lp
            .nodes
            .get(cur)
            .and_then(|n| n.next)
            .filter(|k| *k != self.start);
        Some(cur)
    }
}

impl Loop {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    #[inline]
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> + '_ {
        self.nodes.iter()
    }

    pub(crate) fn get(&self, key: NodeKey) -> Result<&Node, PathError> {
        self.nodes.get(key).ok_or(PathError::UnknownNode(key))
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> Result<&mut Node, PathError> {
        self.nodes.get_mut(key).ok_or(PathError::UnknownNode(key))
    }

    pub(crate) fn insert(&mut self, node: Node) -> NodeKey {
        self.dirty = true;
        self.nodes.insert(node)
    }

    /// New unlinked node at `position` with disabled tangents.
    pub fn add_node(&mut self, position: Vec2) -> NodeKey {
        self.insert(Node::new(position))
    }

    // ---- dirty tracking -------------------------------------------------

    /// Mark `key`, its predecessor, and the loop dirty.
    pub(crate) fn flag_dirty(&mut self, key: NodeKey) {
        let prev = match self.nodes.get_mut(key) {
            Some(n) => {
                n.dirty = true;
                n.prev
            }
            None => return,
        };
        if let Some(p) = prev.and_then(|p| self.nodes.get_mut(p)) {
            p.dirty = true;
        }
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild `key`'s samples if it is dirty (or always, with `force`).
    /// Returns whether a rebuild happened.
    pub fn handle_dirty(&mut self, key: NodeKey, force: bool) -> Result<bool, PathError> {
        let node = self.get(key)?;
        if !node.dirty && !force {
            return Ok(false);
        }
        let position = node.position;
        let bridge = self.bridge(key)?;
        let node = self.get_mut(key)?;
        node.samples = flatten_bridge(key, position, &bridge);
        node.dirty = false;
        Ok(true)
    }

    /// Rebuild samples of every dirty node and clear the loop flag.
    /// Returns how many nodes were rebuilt.
    pub fn flush(&mut self) -> usize {
        if !self.dirty {
            return 0;
        }
        let dirty: Vec<NodeKey> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.dirty)
            .map(|(k, _)| k)
            .collect();
        let mut rebuilt = 0;
        for key in dirty {
            if let Ok(true) = self.handle_dirty(key, false) {
                rebuilt += 1;
            }
        }
        self.dirty = false;
        tracing::trace!(rebuilt, nodes = self.nodes.len(), "flushed loop samples");
        rebuilt
    }

    /// Rebuild every node regardless of flags.
    /// Returns how many nodes were rebuilt.
    pub fn flush_all(&mut self) -> usize {
        let keys: Vec<NodeKey> = self.nodes.keys().collect();
        let mut rebuilt = 0;
        for key in keys {
            match self.handle_dirty(key, true) {
                Ok(_) => rebuilt += 1,
                Err(err) => tracing::warn!(?key, %err, "node samples not rebuilt"),
            }
        }
        self.dirty = false;
        rebuilt
    }

    pub(crate) fn ensure_flushed(&self) -> Result<(), PathError> {
        if self.dirty {
            Err(PathError::NeedsFlush)
        } else {
            Ok(())
        }
    }

    // ---- node mutators ----------------------------------------------------

    pub fn set_position(&mut self, key: NodeKey, position: Vec2) -> Result<(), PathError> {
        self.get_mut(key)?.position = position;
        self.flag_dirty(key);
        Ok(())
    }

    /// Write the incoming tangent (enabling it) and re-derive the outgoing
    /// one under the node's continuity.
    pub fn set_tangent_in(&mut self, key: NodeKey, tangent: Vec2) -> Result<(), PathError> {
        let n = self.get_mut(key)?;
        n.tangent_in = tangent;
        n.use_tangent_in = true;
        n.apply_continuity(TangentSide::In);
        self.flag_dirty(key);
        Ok(())
    }

    /// Write the outgoing tangent (enabling it) and re-derive the incoming
    /// one under the node's continuity.
    pub fn set_tangent_out(&mut self, key: NodeKey, tangent: Vec2) -> Result<(), PathError> {
        let n = self.get_mut(key)?;
        n.tangent_out = tangent;
        n.use_tangent_out = true;
        n.apply_continuity(TangentSide::Out);
        self.flag_dirty(key);
        Ok(())
    }

    /// Write both tangents verbatim; continuity is relaxed if they no longer
    /// satisfy it.
    pub(crate) fn write_tangents(
        &mut self,
        key: NodeKey,
        tin: Option<Vec2>,
        tout: Option<Vec2>,
    ) -> Result<(), PathError> {
        let n = self.get_mut(key)?;
        if let Some(t) = tin {
            n.tangent_in = t;
            n.use_tangent_in = true;
        }
        if let Some(t) = tout {
            n.tangent_out = t;
            n.use_tangent_out = true;
        }
        n.continuity = n.continuity.relaxed_for(n.tangent_in, n.tangent_out);
        self.flag_dirty(key);
        Ok(())
    }

    pub fn set_use_tangents(
        &mut self,
        key: NodeKey,
        use_in: bool,
        use_out: bool,
    ) -> Result<(), PathError> {
        let n = self.get_mut(key)?;
        n.use_tangent_in = use_in;
        n.use_tangent_out = use_out;
        self.flag_dirty(key);
        Ok(())
    }

    /// Change the continuity mode; the incoming tangent drives the outgoing
    /// one unless it is zero.
    pub fn set_continuity(&mut self, key: NodeKey, mode: Continuity) -> Result<(), PathError> {
        let n = self.get_mut(key)?;
        n.continuity = mode;
        let anchor = if n.tangent_in.norm() > TANGENT_EPS {
            TangentSide::In
        } else {
            TangentSide::Out
        };
        n.apply_continuity(anchor);
        self.flag_dirty(key);
        Ok(())
    }

    /// Switch to `Smooth`, rounding the corner first if both tangents are
    /// (near) zero.
    pub fn set_tangents_smooth(&mut self, key: NodeKey) -> Result<(), PathError> {
        self.round_if_flat(key)?;
        self.set_continuity(key, Continuity::Smooth)
    }

    /// Switch to `Symmetric`, rounding the corner first if both tangents are
    /// (near) zero.
    pub fn set_tangents_symmetric(&mut self, key: NodeKey) -> Result<(), PathError> {
        self.round_if_flat(key)?;
        self.set_continuity(key, Continuity::Symmetric)
    }

    /// Auto-round: outgoing tangent along `(next - prev) / 4`, falling back
    /// to whichever neighbour exists.
    fn round_if_flat(&mut self, key: NodeKey) -> Result<(), PathError> {
        let n = self.get(key)?;
        if n.tangent_in.norm() > TANGENT_EPS || n.tangent_out.norm() > TANGENT_EPS {
            let n = self.get_mut(key)?;
            n.use_tangent_in = true;
            n.use_tangent_out = true;
            return Ok(());
        }
        let here = n.position;
        let next = n.next.and_then(|k| self.nodes.get(k)).map(|m| m.position);
        let prev = n.prev.and_then(|k| self.nodes.get(k)).map(|m| m.position);
        let tout = match (prev, next) {
            (Some(p), Some(q)) => (q - p) / 4.0,
            (None, Some(q)) => (q - here) / 4.0,
            (Some(p), None) => (here - p) / 4.0,
            (None, None) => Vec2::zeros(),
        };
        let n = self.get_mut(key)?;
        n.tangent_out = tout;
        n.tangent_in = -tout;
        n.use_tangent_in = true;
        n.use_tangent_out = true;
        Ok(())
    }

    // ---- links --------------------------------------------------------------

    /// Link `a → b`, cutting any previous `a.next` and `b.prev`.
    pub fn connect(&mut self, a: NodeKey, b: NodeKey) -> Result<(), PathError> {
        self.get(a)?;
        self.get(b)?;
        self.detach(a)?;
        if let Some(p) = self.get(b)?.prev {
            self.detach(p)?;
        }
        self.get_mut(a)?.next = Some(b);
        self.get_mut(b)?.prev = Some(a);
        self.flag_dirty(a);
        Ok(())
    }

    /// Cut the outgoing link of `key`; `key` becomes a chain end.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), PathError> {
        let next = self.get_mut(key)?.next.take();
        if let Some(m) = next.and_then(|m| self.nodes.get_mut(m)) {
            m.prev = None;
        }
        self.flag_dirty(key);
        Ok(())
    }

    /// Sever both links, leaving `key` a stray point.
    pub fn disconnect(&mut self, key: NodeKey) -> Result<(), PathError> {
        if let Some(p) = self.get(key)?.prev {
            self.detach(p)?;
        }
        self.detach(key)
    }

    /// Remove `key`, joining its predecessor directly to its successor.
    pub fn dissolve(&mut self, key: NodeKey) -> Result<(), PathError> {
        let n = self.get(key)?;
        let (prev, next) = (n.prev, n.next);
        self.remove(key)?;
        if let (Some(p), Some(m)) = (prev, next) {
            if p != key && m != key && p != m {
                self.connect(p, m)?;
            } else if p == m && p != key {
                // Two-node cycle: the survivor is left as a stray point.
                self.flag_dirty(p);
            }
        }
        Ok(())
    }

    /// Disconnect and delete `key`.
    pub fn remove(&mut self, key: NodeKey) -> Result<Node, PathError> {
        self.disconnect(key)?;
        let node = self.nodes.remove(key).ok_or(PathError::UnknownNode(key))?;
        self.dirty = true;
        Ok(node)
    }

    // ---- chains -----------------------------------------------------------

    /// Iterate the chain starting at `start` along `next` links.
    pub fn chain(&self, start: NodeKey) -> ChainIter<'_> {
        ChainIter {
            lp: self,
            start,
            cur: self.nodes.contains_key(start).then_some(start),
            budget: self.nodes.len(),
        }
    }

    /// Follow `prev` links to the start of an open chain.
    pub fn path_leftmost(&self, key: NodeKey) -> Result<ChainKind, PathError> {
        self.walk_to_end(key, |n| n.prev)
    }

    /// Follow `next` links to the end of an open chain.
    pub fn path_rightmost(&self, key: NodeKey) -> Result<ChainKind, PathError> {
        self.walk_to_end(key, |n| n.next)
    }

    fn walk_to_end(
        &self,
        key: NodeKey,
        step: impl Fn(&Node) -> Option<NodeKey>,
    ) -> Result<ChainKind, PathError> {
        let mut cur = key;
        for _ in 0..=self.nodes.len() {
            match step(self.get(cur)?) {
                None => return Ok(ChainKind::Open(cur)),
                Some(k) if k == key => return Ok(ChainKind::Cyclical),
                Some(k) => cur = k,
            }
        }
        // Ran past the node count without closing: treat as a cycle that
        // does not pass through `key`.
        Ok(ChainKind::Cyclical)
    }

    /// Canonical island containing `key`.
    pub fn island_of(&self, key: NodeKey) -> Result<Island, PathError> {
        let (start, cyclical) = match self.path_leftmost(key)? {
            ChainKind::Open(s) => (s, false),
            ChainKind::Cyclical => (key, true),
        };
        Ok(Island {
            start,
            cyclical,
            len: self.chain(start).count(),
        })
    }

    /// Every island exactly once.
    pub fn islands(&self) -> Vec<Island> {
        let mut seen: SecondaryMap<NodeKey, ()> = SecondaryMap::new();
        let mut out = Vec::new();
        for key in self.nodes.keys() {
            if seen.contains_key(key) {
                continue;
            }
            let Ok(island) = self.island_of(key) else {
                continue;
            };
            for k in self.chain(island.start) {
                seen.insert(k, ());
            }
            out.push(island);
        }
        out
    }

    pub(crate) fn same_island(&self, a: NodeKey, b: NodeKey) -> Result<bool, PathError> {
        let island = self.island_of(a)?;
        self.get(b)?;
        Ok(self.chain(island.start).any(|k| k == b))
    }

    pub(crate) fn require_cyclical(&self, key: NodeKey) -> Result<(), PathError> {
        match self.path_rightmost(key)? {
            ChainKind::Cyclical => Ok(()),
            ChainKind::Open(_) => Err(PathError::NotCyclical(key)),
        }
    }

    // ---- validation -------------------------------------------------------

    /// O(n) structural check: every link targets a live node and is mirrored.
    pub fn test_validity(&self) -> Result<(), ValidityError> {
        for (key, n) in self.nodes.iter() {
            if let Some(m) = n.next {
                let Some(target) = self.nodes.get(m) else {
                    tracing::warn!(?key, ?m, "dangling next link");
                    return Err(ValidityError::DanglingLink { node: key, link: m });
                };
                if target.prev != Some(key) {
                    tracing::warn!(?key, ?m, "asymmetric next link");
                    return Err(ValidityError::AsymmetricLink { from: key, to: m });
                }
            }
            if let Some(p) = n.prev {
                let Some(source) = self.nodes.get(p) else {
                    tracing::warn!(?key, ?p, "dangling prev link");
                    return Err(ValidityError::DanglingLink { node: key, link: p });
                };
                if source.next != Some(key) {
                    tracing::warn!(?key, ?p, "asymmetric prev link");
                    return Err(ValidityError::AsymmetricLink { from: p, to: key });
                }
            }
        }
        Ok(())
    }

    // ---- copying ----------------------------------------------------------

    /// Unlinked copy of a node's geometry.
    pub fn clone_node(&mut self, key: NodeKey) -> Result<NodeKey, PathError> {
        let copy = self.get(key)?.clone_geometry();
        Ok(self.insert(copy))
    }

    /// Copy the island through `key`; returns the copy of the island start.
    pub fn duplicate_island(&mut self, key: NodeKey) -> Result<NodeKey, PathError> {
        let island = self.island_of(key)?;
        let keys: Vec<NodeKey> = self.chain(island.start).collect();
        let mut copies = Vec::with_capacity(keys.len());
        for &k in &keys {
            copies.push(self.clone_node(k)?);
        }
        for w in copies.windows(2) {
            self.link_raw(w[0], w[1]);
        }
        if island.cyclical {
            if let (Some(&last), Some(&first)) = (copies.last(), copies.first()) {
                self.link_raw(last, first);
            }
        }
        debug_assert!(self.test_validity().is_ok());
        copies.first().copied().ok_or(PathError::UnknownNode(key))
    }

    /// Reverse the traversal direction of the island through `key`,
    /// swapping each node's tangents so geometry is unchanged.
    pub fn reverse_island(&mut self, key: NodeKey) -> Result<(), PathError> {
        let island = self.island_of(key)?;
        let keys: Vec<NodeKey> = self.chain(island.start).collect();
        for k in keys {
            let n = self.get_mut(k)?;
            std::mem::swap(&mut n.next, &mut n.prev);
            std::mem::swap(&mut n.tangent_in, &mut n.tangent_out);
            std::mem::swap(&mut n.use_tangent_in, &mut n.use_tangent_out);
            n.dirty = true;
        }
        self.dirty = true;
        Ok(())
    }

    /// Move every node of `other` into this loop. Returns the key remap.
    pub fn merge(&mut self, other: Loop) -> SecondaryMap<NodeKey, NodeKey> {
        let mut remap = SecondaryMap::new();
        for (k, n) in other.nodes.iter() {
            remap.insert(k, self.insert(n.clone_geometry()));
        }
        for (k, n) in other.nodes.iter() {
            if let (Some(&a), Some(b)) = (remap.get(k), n.next.and_then(|m| remap.get(m))) {
                self.link_raw(a, *b);
            }
        }
        remap
    }

    /// Link without cutting existing links; callers guarantee both ends are free.
    pub(crate) fn link_raw(&mut self, a: NodeKey, b: NodeKey) {
        if let Some(n) = self.nodes.get_mut(a) {
            n.next = Some(b);
            n.dirty = true;
        }
        if let Some(n) = self.nodes.get_mut(b) {
            n.prev = Some(a);
        }
        self.dirty = true;
    }
}
