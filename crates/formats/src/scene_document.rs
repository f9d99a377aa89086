use std::fmt;
use std::fs;
use std::path::Path;

use scene::{Asset, NavigationLink, SceneGraph, SceneSnapshot};
use serde::{Deserialize, Serialize};

pub const DOCUMENT_VERSION: &str = "1.0";

/// On-disk envelope around a [`SceneSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneDocument {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub navigation: Vec<NavigationLink>,
}

#[derive(Debug)]
pub enum SceneDocumentError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    UnsupportedVersion { found: String },
}

impl fmt::Display for SceneDocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneDocumentError::Io(err) => write!(f, "I/O error: {err}"),
            SceneDocumentError::Parse(err) => write!(f, "Scene document parse error: {err}"),
            SceneDocumentError::UnsupportedVersion { found } => {
                write!(f, "Unsupported scene document version: {found}")
            }
        }
    }
}

impl std::error::Error for SceneDocumentError {}

impl SceneDocument {
    pub fn new() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name: None,
            assets: Vec::new(),
            navigation: Vec::new(),
        }
    }

    pub fn from_snapshot(name: Option<String>, snapshot: SceneSnapshot) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            name,
            assets: snapshot.assets,
            navigation: snapshot.navigation,
        }
    }

    pub fn from_graph(name: Option<String>, graph: &SceneGraph) -> Self {
        Self::from_snapshot(name, graph.snapshot())
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            assets: self.assets.clone(),
            navigation: self.navigation.clone(),
        }
    }

    /// Sanitized and repaired graph; see [`SceneGraph::from_snapshot`].
    pub fn to_graph(&self) -> SceneGraph {
        SceneGraph::from_snapshot(self.snapshot())
    }

    pub fn from_json_str(payload: &str) -> Result<Self, SceneDocumentError> {
        let doc: SceneDocument = serde_json::from_str(payload).map_err(SceneDocumentError::Parse)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(SceneDocumentError::UnsupportedVersion { found: doc.version });
        }
        Ok(doc)
    }

    pub fn to_json_string(&self) -> Result<String, SceneDocumentError> {
        serde_json::to_string_pretty(self).map_err(SceneDocumentError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneDocumentError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(SceneDocumentError::Io)?;
        let doc = Self::from_json_str(&payload)?;
        tracing::debug!(
            path = %path.display(),
            assets = doc.assets.len(),
            links = doc.navigation.len(),
            "loaded scene document"
        );
        Ok(doc)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneDocumentError> {
        let path = path.as_ref();
        let payload = self.to_json_string()?;
        fs::write(path, payload).map_err(SceneDocumentError::Io)?;
        tracing::debug!(path = %path.display(), "saved scene document");
        Ok(())
    }
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}
