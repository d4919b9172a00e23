//! 2D vector paths, flattening, and ear-clipping tessellation.
//!
//! Purpose
//! - Represent open and closed outlines as a node graph (position + Hermite
//!   tangents + continuity), flatten them into cached samples, and convert
//!   closed outlines into triangle meshes (fill, stroke, hollow outline).
//! - Provide the editing primitives (subdivide, bridge, inflate, winding,
//!   ray intersection) that boolean set operations are composed from.
//!
//! Layout
//! - `path`: node arena (`Loop`), samples, geometric queries, structural edits.
//! - `fill`: disposable fill islands, ear clipping, sessions, vertex dedup.
//! - `curve`, `roots`, `geom`, `bounds`: the maths underneath.
//!
//! Conventions
//! - y-up; positive winding / signed area means counter-clockwise.
//! - All threshold comparisons go through the constants in `cfg` or the
//!   `PathCfg`/`TessCfg` structs.

pub mod bounds;
pub mod cfg;
pub mod curve;
pub mod fill;
pub mod geom;
pub mod path;
pub mod rand;
pub mod roots;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 2D point/vector type used throughout the crate.
pub type Vec2 = nalgebra::Vector2<f64>;

pub use bounds::Bounds2;
pub use cfg::{PathCfg, TessCfg};
pub use curve::{Bridge, BridgeKind, CubicBez};
pub use fill::{
    EarClipOutcome, EarClipReport, FillIsland, FillSession, Mesh, Orientation, VertexRepo,
    VertexRepo2, VertexRepo3,
};
pub use path::{
    Axis, ChainKind, ClosestPoint, ContourPoint, Continuity, Island, LineExtent, LineHit, Loop,
    Node, NodeKey, PathCommand, PathError, Sample, Shape, TangentSide, ValidityError,
};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::fill::{FillIsland, FillSession, Mesh, Orientation, VertexRepo2};
    pub use crate::path::{
        ChainKind, ContourPoint, Continuity, Loop, NodeKey, PathCommand, PathError, Shape,
    };
    pub use crate::{Bounds2, Bridge, BridgeKind, CubicBez, Vec2};
}
