//! Path node graph: nodes, samples, queries, and structural edits.
//!
//! Purpose
//! - `Loop` owns an arena of `Node`s addressed by generational `NodeKey`s.
//!   Nodes link through `next`/`prev` into open or cyclical chains
//!   ("islands"); one loop may hold any number of independent islands.
//! - Every mutator marks the touched node, its predecessor (whose outgoing
//!   segment also changed) and the loop dirty. `Loop::flush` rebuilds the
//!   sample vectors of dirty nodes; sample-based queries require a flush
//!   first and never re-flush on their own.
//!
//! Invariants
//! - `a.next == Some(b)` iff `b.prev == Some(a)`, restored before any public
//!   method returns. `Loop::test_validity` checks this in O(n).
//! - A node's samples describe its outgoing bridge only; terminators carry a
//!   single sample at their own position.
//!
//! Layout
//! - `node`: node data, continuity rule. `sample`: flattening.
//! - `graph`: arena, mutators, links, chain classification, validity.
//! - `query`: bridge classification and geometric queries.
//! - `edit`: subdivide, deinflect, bridge, inflate.
//! - `commands`: contour/command import and export for outline producers.
//! - `shape`: owner of several loops (top of the dirty chain).

mod commands;
mod edit;
mod graph;
mod node;
mod query;
mod sample;
mod shape;

use std::fmt;

pub use crate::curve::{Axis, ClosestPoint, LineExtent, LineHit};
pub use commands::{ContourPoint, PathCommand};
pub use graph::{ChainIter, ChainKind, Island, Loop};
pub use node::{enforce_continuity, Continuity, Node, NodeKey, TangentSide};
pub use sample::Sample;
pub use shape::Shape;

/// Errors surfaced by keyed node-graph operations.
#[derive(Clone, Debug, PartialEq)]
pub enum PathError {
    /// The key does not (or no longer) name a node of this loop.
    UnknownNode(NodeKey),
    /// The operation needs a successor but the node ends its chain.
    NoSuccessor(NodeKey),
    /// The operation needs a cyclical chain.
    NotCyclical(NodeKey),
    /// Bridging requires two different islands.
    SameIsland,
    /// Sample data is stale; flush before querying.
    NeedsFlush,
    /// A numeric argument is outside its domain.
    InvalidParameter { name: &'static str, value: f64 },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::UnknownNode(k) => write!(f, "unknown node {k:?}"),
            PathError::NoSuccessor(k) => write!(f, "node {k:?} has no successor"),
            PathError::NotCyclical(k) => write!(f, "chain through {k:?} is not cyclical"),
            PathError::SameIsland => write!(f, "bridge endpoints lie on the same island"),
            PathError::NeedsFlush => write!(f, "samples are stale; flush before querying"),
            PathError::InvalidParameter { name, value } => {
                write!(f, "parameter `{name}` out of range: {value}")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Structural violations found by `Loop::test_validity`.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidityError {
    /// A link points at a key that is not in the arena.
    DanglingLink { node: NodeKey, link: NodeKey },
    /// `from.next == to` but `to.prev != from` (or the mirror case).
    AsymmetricLink { from: NodeKey, to: NodeKey },
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityError::DanglingLink { node, link } => {
                write!(f, "node {node:?} links to missing node {link:?}")
            }
            ValidityError::AsymmetricLink { from, to } => {
                write!(f, "link {from:?} -> {to:?} is not mirrored")
            }
        }
    }
}

impl std::error::Error for ValidityError {}

#[cfg(test)]
mod tests;
