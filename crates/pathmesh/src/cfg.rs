//! Tolerances and fixed subdivision counts.
//!
//! Policy
//! - Defaults are fixed constants so call sites do not juggle tolerances.
//!   The few thresholds that tessellation callers legitimately tune live in
//!   `TessCfg`; command import reads `PathCfg`.

/// Uniform parameter steps used when flattening a curve bridge into samples.
pub const SAMPLE_STEPS: usize = 20;
/// Tangents shorter than this are treated as absent when classifying bridges.
pub const TANGENT_EPS: f64 = 1e-9;
/// Parameters closer than this to 0 or 1 are treated as segment endpoints.
pub const PARAM_EPS: f64 = 1e-9;
/// Coarse scan resolution for closest-point queries.
pub const CLOSEST_COARSE_STEPS: usize = 32;
/// Bisection refinements after the coarse closest-point scan.
pub const CLOSEST_REFINE_ITERS: usize = 24;
/// Edge length below which an inflate edge counts as degenerate.
pub const EDGE_EPS: f64 = 1e-12;

/// Tolerances for building the node graph from outline producers.
#[derive(Clone, Copy, Debug)]
pub struct PathCfg {
    /// Positions closer than this are treated as coincident (command import).
    pub eps_coincident: f64,
}

impl Default for PathCfg {
    fn default() -> Self {
        Self {
            eps_coincident: 1e-9,
        }
    }
}

/// Tolerances for ear clipping and hole bridging.
#[derive(Clone, Copy, Debug)]
pub struct TessCfg {
    /// Ring points within this distance of a candidate ear corner are ignored.
    pub eps_coincident: f64,
    /// Slack on the orientation tests (cross products) for "on edge" points.
    pub eps_edge: f64,
    /// `|cross|` below which an ear or ring vertex is flat (zero area).
    pub eps_area: f64,
}

impl Default for TessCfg {
    fn default() -> Self {
        Self {
            eps_coincident: 1e-9,
            eps_edge: 1e-12,
            eps_area: 1e-12,
        }
    }
}
