use foundation::math::{CanvasSize, Vec2};
use scene::{GraphError, IngestRequest, SceneSnapshot};
use serde::{Deserialize, Serialize};

/// What a pointer gesture on empty canvas does.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Dragging pans/tilts the image to set the asset's initial view.
    #[default]
    Focus,
    /// Dragging moves navigation markers.
    Navigation,
}

/// A link waiting for its anchor point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLink {
    pub source: usize,
    pub target: usize,
}

/// Input to [`crate::transition`]. Pointer positions are canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    PointerDown { at: Vec2 },
    PointerMove { at: Vec2 },
    PointerUp { at: Vec2 },
    Click { at: Vec2 },

    BeginLink,
    ChooseTarget { target: usize },
    /// Abandons a link workflow, or ends a drag gesture in place.
    Cancel,

    SetMode { mode: EditMode },
    SelectAsset { asset: usize },
    Resize { size: CanvasSize },
    Ingest { request: IngestRequest },
    RemoveAsset { asset: usize },
    RemoveLink { link: usize },
    SetAssetTitle { asset: usize, title: String },
    SetAssetDescription { asset: usize, description: String },
    SetLinkLabel { link: usize, label: String },
    SetLinkDescription { link: usize, description: String },
    ResetView,

    ImageLoaded { generation: u64 },
    ImageFailed { generation: u64, reason: String },
}

/// Why an event left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Linking needs a source and at least one other asset.
    NotEnoughAssets,
    NoCurrentAsset,
    SelfLink { asset: usize },
    /// The placement click landed on an existing marker.
    MarkerOccupied { link: usize },
    UnknownAsset { index: usize },
    UnknownLink { index: usize },
    /// A drag gesture is in progress.
    Busy,
}

impl From<GraphError> for Rejection {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownAsset { index, .. } => Rejection::UnknownAsset { index },
            GraphError::UnknownLink { index, .. } => Rejection::UnknownLink { index },
            GraphError::SelfLink { index } => Rejection::SelfLink { asset: index },
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NotEnoughAssets => write!(f, "linking needs at least two panoramas"),
            Rejection::NoCurrentAsset => write!(f, "no panorama is selected"),
            Rejection::SelfLink { asset } => write!(f, "panorama {asset} cannot link to itself"),
            Rejection::MarkerOccupied { link } => {
                write!(f, "a marker (link {link}) already sits there")
            }
            Rejection::UnknownAsset { index } => write!(f, "unknown panorama {index}"),
            Rejection::UnknownLink { index } => write!(f, "unknown link {index}"),
            Rejection::Busy => write!(f, "a drag is in progress"),
        }
    }
}

/// Work the host performs after a transition, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", content = "data", rename_all = "snake_case")]
pub enum Effect {
    Redraw,
    /// Full scene state after a committed mutation, for the persistence sink.
    SceneChanged(SceneSnapshot),
    /// Fetch `url`; answer with `ImageLoaded`/`ImageFailed` carrying `generation`.
    LoadImage {
        asset: usize,
        url: String,
        generation: u64,
    },
    Rejected(Rejection),
}

#[cfg(test)]
mod tests {
    use super::{EditMode, EditorEvent, Effect, Rejection};
    use foundation::math::Vec2;
    use scene::GraphError;

    #[test]
    fn events_parse_from_tagged_json() {
        let ev: EditorEvent =
            serde_json::from_str(r#"{"type": "pointer_down", "at": {"x": 3.0, "y": 4.0}}"#)
                .expect("parse event");
        assert_eq!(
            ev,
            EditorEvent::PointerDown {
                at: Vec2::new(3.0, 4.0)
            }
        );

        let ev: EditorEvent = serde_json::from_str(r#"{"type": "set_mode", "mode": "navigation"}"#)
            .expect("parse mode");
        assert_eq!(
            ev,
            EditorEvent::SetMode {
                mode: EditMode::Navigation
            }
        );
    }

    #[test]
    fn graph_errors_map_to_rejections() {
        let r: Rejection = GraphError::UnknownLink { index: 4, len: 2 }.into();
        assert_eq!(r, Rejection::UnknownLink { index: 4 });
    }

    #[test]
    fn effects_serialize_tagged() {
        let json = serde_json::to_value(Effect::Rejected(Rejection::SelfLink { asset: 1 }))
            .expect("serialize effect");
        assert_eq!(json["effect"], "rejected");
        assert_eq!(json["data"]["reason"], "self_link");
    }
}
