use foundation::math::{CanvasSize, PlanarProjection, Vec2, ViewRotation, wrap_degrees_360};
use scene::SceneGraph;
use serde::Serialize;

use crate::style::{RenderStyle, Rgba};

/// Load state of the bitmap for the asset being edited.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageStatus {
    #[default]
    Loading,
    Ready,
    Failed { reason: String },
}

/// Backend-neutral draw operations, executed in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    Clear {
        color: Rgba,
    },
    /// Pushes a rotation of `degrees` about `center`; undone by `EndRoll`.
    BeginRoll {
        center: Vec2,
        degrees: f64,
    },
    /// Draws the panorama bitmap stretched to `size` with its top-left at `origin`.
    Image {
        origin: Vec2,
        size: CanvasSize,
    },
    EndRoll,
    Line {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f64,
    },
    Marker {
        link: usize,
        center: Vec2,
        radius: f64,
        color: Rgba,
        label: String,
    },
    Crosshair {
        center: Vec2,
        half_size: f64,
        color: Rgba,
    },
    Text {
        at: Vec2,
        text: String,
        color: Rgba,
    },
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct RenderFrame {
    pub commands: Vec<RenderCommand>,
}

impl RenderFrame {
    pub fn image_draws(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Image { origin, .. } => Some(*origin),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = (usize, Vec2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Marker { link, center, .. } => Some((*link, *center)),
            _ => None,
        })
    }
}

/// Editor decorations layered over the panorama.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Overlay {
    pub selected_link: Option<usize>,
    pub crosshair: bool,
}

/// Everything the tile renderer reads for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    pub scene: &'a SceneGraph,
    pub asset: usize,
    pub view: ViewRotation,
    pub canvas: CanvasSize,
    pub image: &'a ImageStatus,
    pub overlay: Overlay,
}

/// Top-left corners for the base image and its wrap copies.
///
/// The base sits at `(-h, -v)` where `h`/`v` are the pan/tilt pixel offsets.
/// A copy one canvas to the right covers the gap left by a positive offset,
/// one to the left covers the opposite edge, and the vertical rule is the
/// same; diagonals combine both. Base first, at most nine draws.
pub fn tile_origins(view: ViewRotation, canvas: CanvasSize) -> Vec<Vec2> {
    let h = wrap_degrees_360(view.y) / 360.0 * canvas.width;
    let v = (view.x % 360.0) / 360.0 * canvas.height;

    let mut xs = vec![-h];
    if h > 0.0 {
        xs.push(-h + canvas.width);
    }
    if h < canvas.width {
        xs.push(-h - canvas.width);
    }

    let mut ys = vec![-v];
    if v > 0.0 {
        ys.push(-v + canvas.height);
    }
    if v < canvas.height {
        ys.push(-v - canvas.height);
    }

    let mut out = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            out.push(Vec2::new(x, y));
        }
    }
    out
}

pub struct TileRenderer {
    pub style: RenderStyle,
}

impl TileRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    /// Builds the draw sequence: panorama tiles (rolled as one unit), the
    /// horizon guide, the current asset's markers, then the focus crosshair.
    pub fn collect(&self, input: FrameInput<'_>) -> RenderFrame {
        let mut frame = RenderFrame::default();
        let canvas = input.canvas;
        let center = canvas.center();
        let style = &self.style;

        match input.image {
            ImageStatus::Ready => {
                frame.commands.push(RenderCommand::Clear {
                    color: style.background,
                });
                let rolled = input.view.z != 0.0;
                if rolled {
                    frame.commands.push(RenderCommand::BeginRoll {
                        center,
                        degrees: input.view.z,
                    });
                }
                for origin in tile_origins(input.view, canvas) {
                    frame.commands.push(RenderCommand::Image {
                        origin,
                        size: canvas,
                    });
                }
                if rolled {
                    frame.commands.push(RenderCommand::EndRoll);
                }
            }
            ImageStatus::Loading => {
                frame.commands.push(RenderCommand::Clear {
                    color: style.background,
                });
                frame.commands.push(RenderCommand::Text {
                    at: center,
                    text: "Loading panorama…".to_string(),
                    color: style.text,
                });
            }
            ImageStatus::Failed { reason } => {
                frame.commands.push(RenderCommand::Clear {
                    color: style.placeholder_background,
                });
                frame.commands.push(RenderCommand::Text {
                    at: center,
                    text: format!("Image failed to load: {reason}"),
                    color: style.text,
                });
            }
        }

        frame.commands.push(RenderCommand::Line {
            from: Vec2::new(0.0, center.y),
            to: Vec2::new(canvas.width, center.y),
            color: style.horizon,
            width: style.horizon_width_px,
        });

        let projection = PlanarProjection::new(input.view, canvas);
        for (link_index, link) in input.scene.links_from(input.asset) {
            let p = projection.to_planar(link.position.spherical());
            // Projected y is unclamped.
            if !canvas.contains_with_margin(p, style.cull_margin_px) {
                continue;
            }
            let selected = input.overlay.selected_link == Some(link_index);
            let (color, radius) = if selected {
                (style.selected_marker, style.selected_marker_radius_px)
            } else if link.auto_generated {
                (style.auto_marker, style.marker_radius_px)
            } else {
                (style.user_marker, style.marker_radius_px)
            };
            let label = if link.label.is_empty() {
                input
                    .scene
                    .asset(link.to_index)
                    .map(|a| a.title.clone())
                    .unwrap_or_default()
            } else {
                link.label.clone()
            };
            frame.commands.push(RenderCommand::Marker {
                link: link_index,
                center: p,
                radius,
                color,
                label,
            });
        }

        if input.overlay.crosshair {
            frame.commands.push(RenderCommand::Crosshair {
                center,
                half_size: style.crosshair_half_size_px,
                color: style.crosshair,
            });
        }

        frame
    }
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::new(RenderStyle::default())
    }
}
