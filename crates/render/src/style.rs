use serde::{Deserialize, Serialize};

/// Linear RGBA, each channel in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Colors and sizes for the editing canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub background: Rgba,
    pub placeholder_background: Rgba,
    pub text: Rgba,
    pub horizon: Rgba,
    pub horizon_width_px: f64,
    pub user_marker: Rgba,
    pub auto_marker: Rgba,
    pub selected_marker: Rgba,
    pub marker_radius_px: f64,
    pub selected_marker_radius_px: f64,
    /// Markers projected further than this outside the canvas are skipped.
    pub cull_margin_px: f64,
    pub crosshair: Rgba,
    pub crosshair_half_size_px: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: [0.07, 0.08, 0.10, 1.0],
            placeholder_background: [0.20, 0.05, 0.05, 1.0],
            text: [1.0, 1.0, 1.0, 0.92],
            horizon: [1.0, 1.0, 1.0, 0.45],
            horizon_width_px: 1.0,
            user_marker: [0.15, 0.65, 1.0, 1.0],
            auto_marker: [1.0, 0.70, 0.20, 1.0],
            selected_marker: [0.30, 1.0, 0.45, 1.0],
            marker_radius_px: 8.0,
            selected_marker_radius_px: 15.0,
            cull_margin_px: 50.0,
            crosshair: [1.0, 0.25, 0.25, 0.9],
            crosshair_half_size_px: 12.0,
        }
    }
}

/// CSS color string for a canvas fill/stroke style.
pub fn rgba_css(c: Rgba) -> String {
    let r = (c[0].clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (c[1].clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (c[2].clamp(0.0, 1.0) * 255.0).round() as u32;
    let a = c[3].clamp(0.0, 1.0);
    format!("rgba({r},{g},{b},{a})")
}
