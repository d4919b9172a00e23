use super::earclip::{EarClipOutcome, Orientation};
use super::island::{dedup_ring, FillIsland};
use super::repo::VertexRepo2;
use crate::cfg::TessCfg;
use crate::geom::{orient2d, point_in_ring};
use crate::path::{Loop, PathError, Shape};
use crate::Vec2;

/// Indexed triangle mesh produced by a fill session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec2>,
    pub triangles: Vec<[u32; 3]>,
    /// Islands whose ear clipping was abandoned.
    pub aborted_islands: usize,
}

impl Mesh {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle(&self, i: usize) -> Option<[Vec2; 3]> {
        let t = self.triangles.get(i)?;
        Some([
            *self.vertices.get(t[0] as usize)?,
            *self.vertices.get(t[1] as usize)?,
            *self.vertices.get(t[2] as usize)?,
        ])
    }

    /// Signed area of triangle `i` (positive = CCW).
    pub fn signed_area(&self, i: usize) -> f64 {
        self.triangle(i)
            .map_or(0.0, |[a, b, c]| 0.5 * orient2d(a, b, c))
    }

    /// Total unsigned triangle area.
    pub fn area(&self) -> f64 {
        (0..self.triangles.len())
            .map(|i| self.signed_area(i).abs())
            .sum()
    }
}

/// Collects fill islands and turns them into one mesh.
#[derive(Clone, Debug, Default)]
pub struct FillSession {
    islands: Vec<FillIsland>,
    cfg: TessCfg,
}

impl FillSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cfg(cfg: TessCfg) -> Self {
        Self {
            islands: Vec::new(),
            cfg,
        }
    }

    pub fn cfg(&self) -> &TessCfg {
        &self.cfg
    }

    pub fn islands(&self) -> &[FillIsland] {
        &self.islands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.islands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Add a prepared island; empty rings are ignored.
    pub fn add_island(&mut self, island: FillIsland) {
        if !island.is_empty() {
            self.islands.push(island);
        }
    }

    /// Add one fill island per cyclical chain of `lp`. Open chains are not
    /// fillable and are skipped. Returns how many islands were added.
    pub fn add_loop(&mut self, lp: &Loop) -> Result<usize, PathError> {
        if lp.is_dirty() {
            return Err(PathError::NeedsFlush);
        }
        let mut added = 0;
        for island in lp.islands().into_iter().filter(|i| i.cyclical) {
            let ring = dedup_ring(&lp.island_polyline(island.start)?, self.cfg.eps_coincident);
            if ring.len() >= 3 {
                self.islands.push(FillIsland::create_looped(&ring));
                added += 1;
            }
        }
        Ok(added)
    }

    /// Fill every closed island of `shape`.
    pub fn add_shape(&mut self, shape: &Shape) -> Result<usize, PathError> {
        if shape.is_dirty() {
            return Err(PathError::NeedsFlush);
        }
        let mut added = 0;
        for lp in shape.loops() {
            added += self.add_loop(lp)?;
        }
        Ok(added)
    }

    /// Stroke every island of `shape` with a band of `width` centred on the
    /// flattened outline. Closed chains give a seamed band, open ones an
    /// edged band with square ends.
    pub fn add_stroke(&mut self, shape: &Shape, width: f64) -> Result<usize, PathError> {
        if shape.is_dirty() {
            return Err(PathError::NeedsFlush);
        }
        let half = 0.5 * width;
        let mut added = 0;
        for (i, island) in shape.islands() {
            let lp = &shape.loops()[i];
            let line = lp.island_polyline(island.start)?;
            let fill = if island.cyclical {
                let ring = dedup_ring(&line, self.cfg.eps_coincident);
                if ring.len() < 2 {
                    continue;
                }
                FillIsland::create_banded(&ring, -half, half)
            } else {
                let mut line = line;
                line.dedup_by(|a, b| (*a - *b).norm() <= self.cfg.eps_coincident);
                if line.len() < 2 {
                    continue;
                }
                FillIsland::create_edged(&line, -half, half)
            };
            self.add_island(fill);
            added += 1;
        }
        Ok(added)
    }

    /// Hollow outline of every closed island of `shape`: the flattened ring
    /// plus an outward band of `width`.
    pub fn add_outline(&mut self, shape: &Shape, width: f64) -> Result<usize, PathError> {
        let mut tmp = FillSession::with_cfg(self.cfg);
        let added = tmp.add_shape(shape)?;
        for mut island in tmp.islands {
            island.make_outline_bridged(width);
            self.add_island(island);
        }
        Ok(added)
    }

    /// Splice hole islands into their containing outlines.
    ///
    /// The dominant orientation is that of the island with the largest
    /// absolute winding; islands winding the other way are holes. Each hole
    /// joins the smallest same-orientation island containing its leftmost
    /// vertex. Holes without a container (or without a visible bridge)
    /// stay as separate islands. Returns the number of absorbed holes.
    pub fn bridge_holes(&mut self) -> usize {
        let Some(dominant) = self
            .islands
            .iter()
            .map(|i| i.winding())
            .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal))
        else {
            return 0;
        };
        let positive = dominant >= 0.0;
        let (mut outers, mut holes): (Vec<FillIsland>, Vec<FillIsland>) = std::mem::take(&mut self.islands)
            .into_iter()
            .partition(|i| (i.winding() >= 0.0) == positive);
        // Left to right, so earlier bridges never hide later ones.
        holes.sort_by(|a, b| {
            let ax = a.points().iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            let bx = b.points().iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        });
        let outer_rings: Vec<Vec<Vec2>> = outers.iter().map(FillIsland::points).collect();

        let mut absorbed = 0;
        let mut leftover = Vec::new();
        for hole in holes {
            let probe = hole
                .leftmost()
                .and_then(|k| hole.segment(k))
                .map(|s| s.position);
            let container = probe.and_then(|p| {
                outer_rings
                    .iter()
                    .enumerate()
                    .filter(|(_, ring)| point_in_ring(ring, p))
                    .min_by(|(i, _), (j, _)| {
                        outers[*i]
                            .winding()
                            .abs()
                            .partial_cmp(&outers[*j].winding().abs())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|(i, _)| i)
            });
            match container {
                Some(i) => match outers[i].absorb_hole(hole, &self.cfg) {
                    Ok(()) => absorbed += 1,
                    Err(hole) => {
                        tracing::warn!("no visible bridge for hole; filling it separately");
                        leftover.push(hole);
                    }
                },
                None => leftover.push(hole),
            }
        }
        outers.extend(leftover);
        self.islands = outers;
        absorbed
    }

    /// Triangulate a copy of the session; `self` stays usable.
    pub fn triangulate(&self, orientation: Orientation) -> Mesh {
        self.clone().consume(orientation)
    }

    /// Triangulate destructively.
    pub fn consume(self, orientation: Orientation) -> Mesh {
        let mut repo = VertexRepo2::new();
        let mut triangles = Vec::new();
        let mut aborted = 0;
        for mut island in self.islands {
            let report =
                island.consume_into_triangles(&mut repo, &mut triangles, orientation, &self.cfg);
            if let EarClipOutcome::Aborted { remaining } = report.outcome {
                tracing::debug!(remaining, "island left partially triangulated");
                aborted += 1;
            }
        }
        tracing::debug!(
            vertices = repo.len(),
            triangles = triangles.len(),
            aborted,
            "fill session triangulated"
        );
        Mesh {
            vertices: repo.into_vec(),
            triangles,
            aborted_islands: aborted,
        }
    }
}
