mod doc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use doc::{MeshDoc, ShapeDoc};
use pathmesh::fill::{FillSession, Orientation};
use pathmesh::path::Shape;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "pathmesh-cli")]
#[command(about = "Tessellate vector outlines into triangle meshes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum OrientationArg {
    #[default]
    Ccw,
    Cw,
}

impl From<OrientationArg> for Orientation {
    fn from(o: OrientationArg) -> Self {
        match o {
            OrientationArg::Ccw => Orientation::CounterClockwise,
            OrientationArg::Cw => Orientation::Clockwise,
        }
    }
}

#[derive(Args, Clone, Debug)]
struct Common {
    /// Shape document (JSON contours)
    #[arg(long)]
    input: PathBuf,
    /// Mesh output path; stdout when omitted
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OrientationArg::Ccw)]
    orientation: OrientationArg,
    /// Split S-shaped curves before flattening
    #[arg(long)]
    deinflect: bool,
}

#[derive(Subcommand)]
enum Action {
    /// Fill every closed contour
    Fill {
        #[command(flatten)]
        common: Common,
        /// Splice opposite-winding contours into their containers as holes
        #[arg(long)]
        bridge_holes: bool,
    },
    /// Stroke every contour with a band centred on the outline
    Stroke {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 1.0)]
        width: f64,
    },
    /// Hollow outline: each closed contour plus an outward band
    Outline {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 1.0)]
        width: f64,
    },
    /// Print islands, windings and bounds of a shape document
    Report {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Fill {
            common,
            bridge_holes,
        } => {
            let mesh = fill(&common, bridge_holes)?;
            mesh.write(common.out.as_deref())
        }
        Action::Stroke { common, width } => {
            let mesh = stroke(&common, width)?;
            mesh.write(common.out.as_deref())
        }
        Action::Outline { common, width } => {
            let mesh = outline(&common, width)?;
            mesh.write(common.out.as_deref())
        }
        Action::Report { input } => {
            let report = report(&input)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

/// Read, optionally deinflect, and flush the input shape.
fn load(common: &Common) -> Result<Shape> {
    let mut shape = ShapeDoc::read(&common.input)?.to_shape()?;
    if common.deinflect {
        let splits = shape.deinflect_all().context("deinflecting input")?;
        tracing::info!(splits, "deinflected");
    }
    let rebuilt = shape.flush();
    tracing::info!(input = %common.input.display(), rebuilt, "loaded shape");
    Ok(shape)
}

fn finish(session: FillSession, common: &Common) -> MeshDoc {
    let mesh = session.consume(common.orientation.into());
    if mesh.aborted_islands > 0 {
        tracing::warn!(aborted = mesh.aborted_islands, "some islands were not fully triangulated");
    }
    tracing::info!(
        vertices = mesh.vertices.len(),
        triangles = mesh.triangles.len(),
        "tessellated"
    );
    MeshDoc::from(&mesh)
}

fn fill(common: &Common, bridge_holes: bool) -> Result<MeshDoc> {
    let shape = load(common)?;
    let mut session = FillSession::new();
    let islands = session.add_shape(&shape)?;
    if bridge_holes {
        let absorbed = session.bridge_holes();
        tracing::info!(islands, absorbed, "bridged holes");
    }
    Ok(finish(session, common))
}

fn stroke(common: &Common, width: f64) -> Result<MeshDoc> {
    anyhow::ensure!(width.is_finite() && width > 0.0, "stroke width must be positive");
    let shape = load(common)?;
    let mut session = FillSession::new();
    session.add_stroke(&shape, width)?;
    Ok(finish(session, common))
}

fn outline(common: &Common, width: f64) -> Result<MeshDoc> {
    anyhow::ensure!(width.is_finite(), "outline width must be finite");
    let shape = load(common)?;
    let mut session = FillSession::new();
    session.add_outline(&shape, width)?;
    Ok(finish(session, common))
}

fn report(input: &std::path::Path) -> Result<serde_json::Value> {
    let mut shape = ShapeDoc::read(input)?.to_shape()?;
    shape.flush();
    let mut islands = Vec::new();
    for (i, island) in shape.islands() {
        let lp = &shape.loops()[i];
        let area = lp.island_winding(island.start)?;
        let b = lp.island_bounds(island.start)?;
        islands.push(serde_json::json!({
            "nodes": island.len,
            "closed": island.cyclical,
            "signed_area": area,
            "bounds": [[b.min.x, b.min.y], [b.max.x, b.max.y]],
        }));
    }
    Ok(serde_json::json!({
        "version": pathmesh::VERSION,
        "islands": islands,
    }))
}
