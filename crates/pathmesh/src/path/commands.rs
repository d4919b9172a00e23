//! Import/export between the node graph and outline producers.
//!
//! Glyph rasterisers and SVG-like sources speak either absolute drawing
//! commands (`PathCommand`) or per-contour point lists with tangents
//! (`ContourPoint`). Both land in a `Loop` as ordinary islands.

use super::graph::{ChainKind, Loop};
use super::node::{Continuity, NodeKey};
use super::PathError;
use crate::cfg::{PathCfg, TANGENT_EPS};
use crate::curve::Bridge;
use crate::geom::approx_eq;
use crate::Vec2;

/// Absolute drawing command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Two control points, then the end point.
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// Point of a contour with tangents relative to its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourPoint {
    pub position: Vec2,
    pub tangent_in: Vec2,
    pub tangent_out: Vec2,
    pub continuity: Continuity,
}

impl ContourPoint {
    /// Corner point without tangents.
    pub fn corner(position: Vec2) -> Self {
        Self {
            position,
            tangent_in: Vec2::zeros(),
            tangent_out: Vec2::zeros(),
            continuity: Continuity::Disconnected,
        }
    }
}

impl Loop {
    /// Append one contour; `closed` links the last point back to the first.
    /// Returns the first node, or `None` for an empty contour.
    ///
    /// Tangents and continuity are stored as given; non-zero tangents are
    /// enabled.
    pub fn push_contour(&mut self, points: &[ContourPoint], closed: bool) -> Option<NodeKey> {
        let mut keys = Vec::with_capacity(points.len());
        for p in points {
            let k = self.add_node(p.position);
            if let Ok(n) = self.get_mut(k) {
                n.tangent_in = p.tangent_in;
                n.tangent_out = p.tangent_out;
                n.use_tangent_in = p.tangent_in.norm() > TANGENT_EPS;
                n.use_tangent_out = p.tangent_out.norm() > TANGENT_EPS;
                n.continuity = p.continuity;
            }
            keys.push(k);
        }
        for w in keys.windows(2) {
            self.link_raw(w[0], w[1]);
        }
        if closed && keys.len() > 1 {
            if let (Some(&last), Some(&first)) = (keys.last(), keys.first()) {
                self.link_raw(last, first);
            }
        }
        keys.first().copied()
    }

    /// Replay drawing commands; returns the first node of each subpath.
    ///
    /// `Close` links back to the subpath start, merging a final point that
    /// coincides with it. A drawing command without a current point starts a
    /// new subpath at its end point.
    pub fn append_commands(&mut self, commands: &[PathCommand], cfg: &PathCfg) -> Vec<NodeKey> {
        let mut starts = Vec::new();
        let mut first: Option<NodeKey> = None;
        let mut current: Option<NodeKey> = None;
        for cmd in commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    let k = self.add_node(p);
                    starts.push(k);
                    first = Some(k);
                    current = Some(k);
                }
                PathCommand::LineTo(p) => {
                    let k = self.add_node(p);
                    match current {
                        Some(c) => self.link_raw(c, k),
                        None => {
                            starts.push(k);
                            first = Some(k);
                        }
                    }
                    current = Some(k);
                }
                PathCommand::CubicTo(c1, c2, p) => {
                    let k = self.add_node(p);
                    match current {
                        Some(c) => {
                            if let Ok(n) = self.get_mut(c) {
                                n.tangent_out = c1 - n.position;
                                n.use_tangent_out = true;
                            }
                            if let Ok(n) = self.get_mut(k) {
                                n.tangent_in = c2 - p;
                                n.use_tangent_in = true;
                            }
                            self.link_raw(c, k);
                        }
                        None => {
                            starts.push(k);
                            first = Some(k);
                        }
                    }
                    current = Some(k);
                }
                PathCommand::Close => {
                    if let (Some(f), Some(c)) = (first, current) {
                        if f != c {
                            self.close_onto(f, c, cfg.eps_coincident);
                        }
                    }
                    first = None;
                    current = None;
                }
            }
        }
        starts
    }

    /// Close a subpath from `last` to `first`, dropping `last` when it sits
    /// on top of `first` (its incoming tangent moves over).
    fn close_onto(&mut self, first: NodeKey, last: NodeKey, eps: f64) {
        let (Some(f), Some(l)) = (self.node(first), self.node(last)) else {
            return;
        };
        let coincident = approx_eq(f.position, l.position, eps);
        let before = l.prev;
        if coincident && before.is_some_and(|b| b != first) {
            let (tin, use_in) = (l.tangent_in, l.use_tangent_in);
            if self.remove(last).is_err() {
                return;
            }
            if let Ok(n) = self.get_mut(first) {
                n.tangent_in = tin;
                n.use_tangent_in = use_in;
            }
            if let Some(b) = before {
                self.link_raw(b, first);
            }
        } else {
            self.link_raw(last, first);
        }
    }

    /// Export the island through `key` as drawing commands. Cycles end with
    /// an explicit segment back to the start followed by `Close`.
    pub fn to_commands(&self, key: NodeKey) -> Result<Vec<PathCommand>, PathError> {
        let start = match self.path_leftmost(key)? {
            ChainKind::Open(s) => s,
            ChainKind::Cyclical => key,
        };
        let cyclical = matches!(self.path_rightmost(start)?, ChainKind::Cyclical);
        let mut out = vec![PathCommand::MoveTo(self.get(start)?.position)];
        for k in self.chain(start) {
            match self.bridge(k)? {
                Bridge::None => {}
                Bridge::Line(_, b) => out.push(PathCommand::LineTo(b)),
                Bridge::Curve(c) => out.push(PathCommand::CubicTo(c.p1, c.p2, c.p3)),
            }
        }
        if cyclical {
            out.push(PathCommand::Close);
        }
        Ok(out)
    }
}
