use foundation::math::StorageRotation;
use serde::{Deserialize, Serialize};

/// One panorama in the scene.
///
/// `index` always equals the asset's position in [`crate::SceneGraph::assets`];
/// the graph rewrites it after removals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub index: usize,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
    /// Initial view, storage axes.
    #[serde(default)]
    pub rotation: StorageRotation,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Asset {
    pub fn from_ingest(index: usize, request: IngestRequest) -> Self {
        let title = request
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title(index));
        Self {
            index,
            url: request.url,
            thumb: request.thumbnail,
            rotation: StorageRotation::default(),
            title,
            description: request.description.unwrap_or_default(),
        }
    }
}

fn default_title(index: usize) -> String {
    format!("Panorama {}", index + 1)
}

/// A newly added panorama, as handed over by the ingestion collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl IngestRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
