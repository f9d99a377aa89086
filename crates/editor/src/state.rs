use foundation::math::{CanvasSize, PlanarProjection, Vec2, ViewRotation};
use render::ImageStatus;
use scene::{SceneGraph, SceneSnapshot};

use crate::event::{EditMode, PendingLink};
use crate::image_load::ImageLoads;

/// Where the current gesture or link workflow stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Focus-mode drag; `last` is the previous pointer sample.
    DraggingImage { last: Vec2, moved: bool },
    DraggingMarker { link: usize },
    SelectingTarget { source: usize },
    PlacingMarker { pending: PendingLink },
}

impl Interaction {
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            Interaction::DraggingImage { .. } | Interaction::DraggingMarker { .. }
        )
    }
}

/// Everything the editor knows, threaded through [`crate::transition`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneEditorState {
    pub scene: SceneGraph,
    /// Asset being edited; `None` only while the scene is empty.
    pub current: Option<usize>,
    /// Live view of `current`, canvas axes.
    pub view: ViewRotation,
    pub canvas: CanvasSize,
    pub mode: EditMode,
    pub interaction: Interaction,
    pub selected_link: Option<usize>,
    pub image: ImageStatus,
    pub loads: ImageLoads,
}

impl SceneEditorState {
    /// Sanitizes and repairs `snapshot`. No asset is opened yet; the
    /// controller does that so the image load is issued as an effect.
    pub fn from_snapshot(snapshot: SceneSnapshot) -> Self {
        Self {
            scene: SceneGraph::from_snapshot(snapshot),
            ..Self::default()
        }
    }

    pub fn projection(&self) -> PlanarProjection {
        PlanarProjection::new(self.view, self.canvas)
    }

    /// View stored on `asset`, converted to canvas axes.
    pub fn stored_view(&self, asset: usize) -> ViewRotation {
        self.scene
            .asset(asset)
            .map(|a| a.rotation.to_view().normalized())
            .unwrap_or_default()
    }
}
