use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{PlanarProjection, Vec2};

use crate::graph::SceneGraph;

/// Hit radius around a projected marker, in pixels. Larger than the drawn
/// glyph so small markers stay easy to grab.
pub const DEFAULT_HIT_RADIUS_PX: f64 = 20.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerHit {
    /// Index into [`SceneGraph::links`].
    pub link: usize,
    /// Projected marker position on the canvas.
    pub point: Vec2,
    pub distance: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub radius_px: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            radius_px: DEFAULT_HIT_RADIUS_PX,
        }
    }
}

/// True when `pointer` is within `radius_px` of `marker` (boundary inclusive).
pub fn within_hit_radius(marker: Vec2, pointer: Vec2, radius_px: f64) -> bool {
    marker.distance(pointer) <= radius_px
}

/// Deterministic marker picking on the canvas of `asset`.
///
/// Ordering contract:
/// - The closest marker within the hit radius wins.
/// - Ties go to the lower link index.
pub fn pick_marker(
    scene: &SceneGraph,
    asset: usize,
    projection: &PlanarProjection,
    pointer: Vec2,
    opts: PickOptions,
) -> Option<MarkerHit> {
    let mut best: Option<MarkerHit> = None;

    for (link, l) in scene.links_from(asset) {
        let point = projection.to_planar(l.position.spherical());
        if !within_hit_radius(point, pointer, opts.radius_px) {
            continue;
        }
        let distance = point.distance(pointer);

        let candidate = MarkerHit {
            link,
            point,
            distance,
        };
        best = match best {
            None => Some(candidate),
            Some(b) => {
                let ord = stable_total_cmp_f64(distance, b.distance)
                    .then_with(|| link.cmp(&b.link));
                if ord.is_lt() { Some(candidate) } else { Some(b) }
            }
        };
    }

    best
}
