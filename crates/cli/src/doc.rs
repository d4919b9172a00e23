//! JSON documents read and written by the CLI.
//!
//! Input is a list of contours in producer form (points with optional
//! tangents); output is an indexed mesh plus a little metadata.

use anyhow::{bail, Context, Result};
use nalgebra::Vector2;
use pathmesh::path::{Continuity, ContourPoint, Loop, Shape};
use pathmesh::Mesh;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityDoc {
    #[default]
    Disconnected,
    Smooth,
    Symmetric,
}

impl From<ContinuityDoc> for Continuity {
    fn from(c: ContinuityDoc) -> Self {
        match c {
            ContinuityDoc::Disconnected => Continuity::Disconnected,
            ContinuityDoc::Smooth => Continuity::Smooth,
            ContinuityDoc::Symmetric => Continuity::Symmetric,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointDoc {
    pub position: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangent_in: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tangent_out: Option<[f64; 2]>,
    #[serde(default)]
    pub continuity: ContinuityDoc,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContourDoc {
    #[serde(default = "default_closed")]
    pub closed: bool,
    pub points: Vec<PointDoc>,
}

fn default_closed() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDoc {
    pub contours: Vec<ContourDoc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshDoc {
    pub vertices: Vec<[f64; 2]>,
    pub triangles: Vec<[u32; 3]>,
    pub area: f64,
    pub aborted_islands: usize,
}

fn vec2(a: Option<[f64; 2]>) -> Vector2<f64> {
    a.map_or_else(Vector2::zeros, |[x, y]| Vector2::new(x, y))
}

impl ShapeDoc {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    /// One loop holding every contour as its own island.
    pub fn to_shape(&self) -> Result<Shape> {
        let mut lp = Loop::new();
        for (i, c) in self.contours.iter().enumerate() {
            if c.points.iter().any(|p| {
                p.position.iter().any(|v| !v.is_finite())
                    || [p.tangent_in, p.tangent_out]
                        .iter()
                        .flatten()
                        .flatten()
                        .any(|v| !v.is_finite())
            }) {
                bail!("contour {i} has non-finite coordinates");
            }
            let points: Vec<ContourPoint> = c
                .points
                .iter()
                .map(|p| ContourPoint {
                    position: vec2(Some(p.position)),
                    tangent_in: vec2(p.tangent_in),
                    tangent_out: vec2(p.tangent_out),
                    continuity: p.continuity.into(),
                })
                .collect();
            lp.push_contour(&points, c.closed);
        }
        let mut shape = Shape::new();
        shape.add_loop(lp);
        Ok(shape)
    }
}

impl From<&Mesh> for MeshDoc {
    fn from(m: &Mesh) -> Self {
        Self {
            vertices: m.vertices.iter().map(|v| [v.x, v.y]).collect(),
            triangles: m.triangles.clone(),
            area: m.area(),
            aborted_islands: m.aborted_islands,
        }
    }
}

impl MeshDoc {
    /// Write to `path`, or stdout when `None`.
    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        match path {
            Some(p) => {
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)
                            .with_context(|| format!("creating output dir {}", parent.display()))?;
                    }
                }
                fs::write(p, bytes).with_context(|| format!("writing {}", p.display()))
            }
            None => {
                println!("{}", String::from_utf8_lossy(&bytes));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_contour() {
        let doc: ShapeDoc = serde_json::from_str(
            r#"{ "contours": [ { "points": [
                { "position": [0, 0] },
                { "position": [1, 0], "tangent_out": [0, 0.5], "continuity": "smooth" },
                { "position": [0, 1] }
            ] } ] }"#,
        )
        .unwrap();
        assert!(doc.contours[0].closed);
        assert_eq!(doc.contours[0].points[1].continuity, ContinuityDoc::Smooth);
        let shape = doc.to_shape().unwrap();
        assert_eq!(shape.islands().len(), 1);
        assert!(shape.islands()[0].1.cyclical);
    }

    #[test]
    fn rejects_unknown_continuity() {
        let err = serde_json::from_str::<ShapeDoc>(
            r#"{ "contours": [ { "points": [ { "position": [0, 0], "continuity": "wobbly" } ] } ] }"#,
        );
        assert!(err.is_err());
    }
}
