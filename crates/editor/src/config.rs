use render::RenderStyle;
use scene::picking::{DEFAULT_HIT_RADIUS_PX, PickOptions};
use serde::{Deserialize, Serialize};

/// Default drag sensitivity, degrees of pan/tilt per pixel of pointer travel.
pub const DEFAULT_DRAG_DEGREES_PER_PX: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub hit_radius_px: f64,
    pub drag_degrees_per_px: f64,
    pub style: RenderStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_radius_px: DEFAULT_HIT_RADIUS_PX,
            drag_degrees_per_px: DEFAULT_DRAG_DEGREES_PER_PX,
            style: RenderStyle::default(),
        }
    }
}

impl EditorConfig {
    pub fn pick_options(&self) -> PickOptions {
        PickOptions {
            radius_px: self.hit_radius_px,
        }
    }
}
