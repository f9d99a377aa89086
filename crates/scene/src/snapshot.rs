use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::link::NavigationLink;

/// Full serializable scene state handed to the persistence collaborator.
///
/// Emitted after every committed mutation; also the only way persisted state
/// enters the editor (see [`crate::SceneGraph::from_snapshot`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub navigation: Vec<NavigationLink>,
}
