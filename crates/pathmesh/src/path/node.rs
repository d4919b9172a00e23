use slotmap::new_key_type;

use super::sample::Sample;
use crate::cfg::TANGENT_EPS;
use crate::Vec2;

new_key_type! {
    /// Generational handle of a node inside its `Loop`.
    pub struct NodeKey;
}

/// Rule tying a node's two tangents together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Continuity {
    /// Tangents are independent (corner).
    #[default]
    Disconnected,
    /// Opposite directions, independent magnitudes.
    Smooth,
    /// Equal and opposite vectors.
    Symmetric,
}

impl Continuity {
    /// Weakest mode that the given tangents still satisfy, starting from `self`.
    ///
    /// Used after raw tangent writes (subdivision, bridging) so geometry is
    /// preserved and the mode never claims more than holds.
    pub fn relaxed_for(self, tin: Vec2, tout: Vec2) -> Continuity {
        let scale = tin.norm().max(tout.norm()).max(1.0);
        let opposite = tin.norm() <= TANGENT_EPS
            || tout.norm() <= TANGENT_EPS
            || (tin.x * tout.y - tin.y * tout.x).abs() <= 1e-9 * scale * scale
                && tin.dot(&tout) <= 0.0;
        match self {
            Continuity::Symmetric if (tin + tout).norm() <= 1e-12 * scale => self,
            Continuity::Symmetric | Continuity::Smooth if opposite => Continuity::Smooth,
            _ => Continuity::Disconnected,
        }
    }
}

/// Which tangent was written last (and therefore drives the other).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TangentSide {
    In,
    Out,
}

/// Re-derive the non-anchor tangent under `mode`.
///
/// - `Smooth`: the other tangent points opposite to the anchor and keeps its
///   own length. A zero anchor leaves both untouched.
/// - `Symmetric`: the other tangent is exactly `-anchor`.
pub fn enforce_continuity(
    mode: Continuity,
    anchor: TangentSide,
    tin: Vec2,
    tout: Vec2,
) -> (Vec2, Vec2) {
    match (mode, anchor) {
        (Continuity::Disconnected, _) => (tin, tout),
        (Continuity::Symmetric, TangentSide::In) => (tin, -tin),
        (Continuity::Symmetric, TangentSide::Out) => (-tout, tout),
        (Continuity::Smooth, TangentSide::In) => {
            let len = tin.norm();
            if len <= TANGENT_EPS {
                (tin, tout)
            } else {
                (tin, -tin / len * tout.norm())
            }
        }
        (Continuity::Smooth, TangentSide::Out) => {
            let len = tout.norm();
            if len <= TANGENT_EPS {
                (tin, tout)
            } else {
                (-tout / len * tin.norm(), tout)
            }
        }
    }
}

/// Path vertex: position, Hermite tangent offsets, continuity, and links.
///
/// Fields are crate-private: every write goes through `Loop` so dirty
/// propagation cannot be skipped.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) position: Vec2,
    pub(crate) tangent_in: Vec2,
    pub(crate) tangent_out: Vec2,
    pub(crate) use_tangent_in: bool,
    pub(crate) use_tangent_out: bool,
    pub(crate) continuity: Continuity,
    pub(crate) next: Option<NodeKey>,
    pub(crate) prev: Option<NodeKey>,
    pub(crate) samples: Vec<Sample>,
    pub(crate) dirty: bool,
}

impl Node {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            tangent_in: Vec2::zeros(),
            tangent_out: Vec2::zeros(),
            use_tangent_in: false,
            use_tangent_out: false,
            continuity: Continuity::Disconnected,
            next: None,
            prev: None,
            samples: Vec::new(),
            dirty: true,
        }
    }

    /// Geometry-only copy: no links, no samples, dirty.
    pub(crate) fn clone_geometry(&self) -> Self {
        Self {
            next: None,
            prev: None,
            samples: Vec::new(),
            dirty: true,
            ..self.clone()
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }
    #[inline]
    pub fn tangent_in(&self) -> Vec2 {
        self.tangent_in
    }
    #[inline]
    pub fn tangent_out(&self) -> Vec2 {
        self.tangent_out
    }
    #[inline]
    pub fn uses_tangent_in(&self) -> bool {
        self.use_tangent_in
    }
    #[inline]
    pub fn uses_tangent_out(&self) -> bool {
        self.use_tangent_out
    }
    #[inline]
    pub fn continuity(&self) -> Continuity {
        self.continuity
    }
    #[inline]
    pub fn next(&self) -> Option<NodeKey> {
        self.next
    }
    #[inline]
    pub fn prev(&self) -> Option<NodeKey> {
        self.prev
    }
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Incoming tangent as it shapes the curve (zero when disabled or tiny).
    #[inline]
    pub fn effective_tangent_in(&self) -> Vec2 {
        if self.use_tangent_in && self.tangent_in.norm() > TANGENT_EPS {
            self.tangent_in
        } else {
            Vec2::zeros()
        }
    }

    /// Outgoing tangent as it shapes the curve (zero when disabled or tiny).
    #[inline]
    pub fn effective_tangent_out(&self) -> Vec2 {
        if self.use_tangent_out && self.tangent_out.norm() > TANGENT_EPS {
            self.tangent_out
        } else {
            Vec2::zeros()
        }
    }

    /// Apply the continuity rule with `anchor` driving the other tangent.
    pub(crate) fn apply_continuity(&mut self, anchor: TangentSide) {
        let (tin, tout) =
            enforce_continuity(self.continuity, anchor, self.tangent_in, self.tangent_out);
        self.tangent_in = tin;
        self.tangent_out = tout;
    }
}
