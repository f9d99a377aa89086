//! Command implementations behind the `panorama` binary.
//!
//! Each command returns a serializable report; `main` prints it as JSON.

use std::fs;
use std::path::Path;

use editor::EditorConfig;
use formats::SceneDocument;
use foundation::math::{CanvasSize, PlanarProjection, Spherical, Vec2, ViewRotation};
use render::{FrameInput, ImageStatus, Overlay, RenderFrame, TileRenderer};
use scene::SceneGraph;
use scene::connectivity::{forward_adjacency, reachable_from};
use serde::Serialize;

pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, String> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    serde_json::from_str(&payload).map_err(|e| format!("config {path:?}: {e}"))
}

pub fn load_document(path: &Path) -> Result<SceneDocument, String> {
    SceneDocument::load(path).map_err(|e| format!("{path:?}: {e}"))
}

#[derive(Debug, Serialize, PartialEq)]
pub struct AssetSummary {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub out_degree: usize,
    pub reachable: bool,
}

/// The document as stored, before any sanitizing or repair.
#[derive(Debug, Serialize, PartialEq)]
pub struct InspectReport {
    pub name: Option<String>,
    pub assets: Vec<AssetSummary>,
    pub links: usize,
    pub auto_links: usize,
    /// Links whose endpoints are missing or equal.
    pub invalid_links: usize,
    pub needs_repair: bool,
}

pub fn inspect(doc: &SceneDocument) -> InspectReport {
    let n = doc.assets.len();
    let valid = |from: usize, to: usize| from < n && to < n && from != to;

    let mut out_degree = vec![0usize; n];
    let mut invalid_links = 0;
    for link in &doc.navigation {
        if valid(link.from_index, link.to_index) {
            out_degree[link.from_index] += 1;
        } else {
            invalid_links += 1;
        }
    }

    let adjacency = forward_adjacency(n, &doc.navigation);
    let mut reachable = vec![false; n];
    for i in reachable_from(0, &adjacency) {
        reachable[i] = true;
    }

    let assets: Vec<AssetSummary> = doc
        .assets
        .iter()
        .enumerate()
        .map(|(i, a)| AssetSummary {
            index: i,
            title: a.title.clone(),
            url: a.url.clone(),
            out_degree: out_degree[i],
            reachable: reachable[i],
        })
        .collect();

    let needs_repair = invalid_links > 0
        || doc.assets.iter().enumerate().any(|(i, a)| a.index != i)
        || (n >= 2 && assets.iter().any(|a| a.out_degree == 0 || !a.reachable));

    InspectReport {
        name: doc.name.clone(),
        links: doc.navigation.len(),
        auto_links: doc.navigation.iter().filter(|l| l.auto_generated).count(),
        assets,
        invalid_links,
        needs_repair,
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RepairSummary {
    pub links_before: usize,
    pub links_after: usize,
    pub added_outgoing: Vec<(usize, usize)>,
    pub added_chained: Vec<(usize, usize)>,
}

/// Sanitizes and repairs `doc`, keeping its name.
pub fn repair(doc: &SceneDocument) -> (SceneDocument, RepairSummary) {
    let (graph, report) = SceneGraph::from_snapshot_with_report(doc.snapshot());
    let repaired = SceneDocument::from_graph(doc.name.clone(), &graph);
    let summary = RepairSummary {
        links_before: doc.navigation.len(),
        links_after: repaired.navigation.len(),
        added_outgoing: report.outgoing,
        added_chained: report.chained,
    };
    (repaired, summary)
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ProjectionReport {
    pub input: Spherical,
    pub planar: Vec2,
    /// `planar` mapped back, rounded to the stored precision.
    pub spherical: Spherical,
}

pub fn project(point: Spherical, view: ViewRotation, canvas: CanvasSize) -> ProjectionReport {
    let projection = PlanarProjection::new(view.normalized(), canvas);
    let planar = projection.to_planar(point);
    ProjectionReport {
        input: point,
        planar,
        spherical: projection.to_spherical(planar),
    }
}

/// Frame for `asset` at its stored view, as if the image had loaded.
pub fn render_frame(
    doc: &SceneDocument,
    asset: usize,
    canvas: CanvasSize,
    config: &EditorConfig,
) -> Result<RenderFrame, String> {
    let graph = doc.to_graph();
    let stored = graph
        .asset(asset)
        .ok_or_else(|| format!("asset {asset} out of range (document has {})", graph.len()))?;
    let view = stored.rotation.to_view().normalized();
    let renderer = TileRenderer::new(config.style.clone());
    Ok(renderer.collect(FrameInput {
        scene: &graph,
        asset,
        view,
        canvas,
        image: &ImageStatus::Ready,
        overlay: Overlay::default(),
    }))
}
