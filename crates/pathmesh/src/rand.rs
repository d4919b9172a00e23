//! Random star-shaped outlines (radial jitter + replay tokens).
//!
//! Purpose
//! - Deterministic simple polygons and smooth contours for property tests
//!   and benches. Rings are star-shaped around the origin, so they never
//!   self-intersect, and are generally non-convex.
//!
//! Model
//! - `n` equally spaced angles on [0, 2π) with bounded angular jitter (kept
//!   below half the spacing so the order is preserved) and independent
//!   radial jitter. Output winds counter-clockwise.
//! - A replay token `(seed, index)` is mixed into a single `StdRng`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::path::{Continuity, ContourPoint};
use crate::Vec2;

/// Vertex count distribution.
#[derive(Clone, Copy, Debug)]
pub enum VertexCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}

impl VertexCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            VertexCount::Fixed(n) => n.max(3),
            VertexCount::Uniform { min, max } => {
                let lo = min.max(3);
                let hi = max.max(lo);
                rng.gen_range(lo..=hi)
            }
        }
    }
}

/// Star sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct StarCfg {
    pub vertex_count: VertexCount,
    /// Angular jitter as a fraction of the spacing Δ=2π/n. Clamped to [0, 0.45].
    pub angle_jitter_frac: f64,
    /// Radii are `base_radius * (1 + u)`, `u ∈ [-radial_jitter, radial_jitter]`,
    /// clamped to [0, 0.9].
    pub radial_jitter: f64,
    pub base_radius: f64,
}

impl Default for StarCfg {
    fn default() -> Self {
        Self {
            vertex_count: VertexCount::Fixed(16),
            angle_jitter_frac: 0.3,
            radial_jitter: 0.5,
            base_radius: 1.0,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a counter-clockwise star-shaped simple polygon.
pub fn draw_star_ring(cfg: StarCfg, tok: ReplayToken) -> Vec<Vec2> {
    let mut rng = tok.to_std_rng();
    let n = cfg.vertex_count.sample(&mut rng);
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.45);
    let rj = cfg.radial_jitter.clamp(0.0, 0.9);
    let r0 = cfg.base_radius.max(1e-9);
    let delta = 2.0 * std::f64::consts::PI / n as f64;
    (0..n)
        .map(|k| {
            let th = k as f64 * delta + (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            let r = (1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * rj) * r0;
            Vec2::new(th.cos() * r, th.sin() * r)
        })
        .collect()
}

/// Star ring turned into a smooth closed contour: every point gets
/// symmetric tangents along the neighbour chord, scaled by `roundness`.
pub fn draw_star_contour(cfg: StarCfg, tok: ReplayToken, roundness: f64) -> Vec<ContourPoint> {
    let ring = draw_star_ring(cfg, tok);
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let tout = (next - prev) * (0.25 * roundness);
            ContourPoint {
                position: ring[i],
                tangent_in: -tout,
                tangent_out: tout,
                continuity: Continuity::Symmetric,
            }
        })
        .collect()
}
