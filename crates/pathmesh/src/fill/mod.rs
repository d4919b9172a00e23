//! Fill tessellation: disposable rings, ear clipping, and vertex dedup.
//!
//! Purpose
//! - Convert flattened outlines into triangle index buffers. A
//!   `FillIsland` is a closed ring of 2D positions built from a sample chain
//!   (or an offset band for strokes) and consumed by ear clipping.
//! - `FillSession` collects islands from shapes, optionally splices holes
//!   into their containing outlines, and produces a `Mesh`.
//!
//! Why this design
//! - Rings live in their own slotmap, never aliasing the path graph, so a
//!   clipping pass can destroy them freely. Sessions clone before
//!   triangulating unless the caller opts into `FillSession::consume`.
//! - Ear clipping degrades instead of spinning: after two full passes with
//!   no clippable ear the island is abandoned and reported.
//!
//! References
//! - Hole bridging follows the classic "leftmost hole vertex, nearest
//!   visible outer vertex" split used by earcut-style triangulators.

mod earclip;
mod island;
mod repo;
mod session;

use std::fmt;

pub use earclip::{EarClipOutcome, EarClipReport, Orientation};
pub use island::{FillIsland, FillSegment, SegKey};
pub use repo::{VertexRepo, VertexRepo2, VertexRepo3};
pub use session::{FillSession, Mesh};

/// Structural violations of a fill ring.
#[derive(Clone, Debug, PartialEq)]
pub enum RingError {
    /// Segments exist but no head is set, or the head is not a segment.
    MissingHead,
    /// A link points at a removed segment.
    DanglingLink(SegKey),
    /// `a.next == b` but `b.prev != a`.
    AsymmetricLink { from: SegKey, to: SegKey },
    /// Walking from the head visits a different number of segments than stored.
    CountMismatch { stored: usize, walked: usize },
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingError::MissingHead => write!(f, "ring has segments but no valid head"),
            RingError::DanglingLink(k) => write!(f, "segment {k:?} links to a removed segment"),
            RingError::AsymmetricLink { from, to } => {
                write!(f, "ring link {from:?} -> {to:?} is not mirrored")
            }
            RingError::CountMismatch { stored, walked } => {
                write!(f, "ring walk visited {walked} of {stored} segments")
            }
        }
    }
}

impl std::error::Error for RingError {}
