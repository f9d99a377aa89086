//! Equirectangular projection between neutral spherical angles and canvas pixels.
//!
//! Composition order is fixed: pan/tilt offset first, then roll about the
//! canvas center. The tile renderer draws the image with the same order so a
//! marker stays on its anchored image pixel while the view rotates.

use super::angle::{Spherical, clamp_spherical};
use super::rotation::ViewRotation;
use super::vec::{CanvasSize, Vec2};

/// Rotates `p` about `center` by `degrees` (canvas convention, y down).
pub fn rotate_about(p: Vec2, center: Vec2, degrees: f64) -> Vec2 {
    center + (p - center).rotated_deg(degrees)
}

/// Horizontal pixel offset produced by a pan angle.
pub fn pan_offset_px(pan_deg: f64, canvas: CanvasSize) -> f64 {
    pan_deg / 360.0 * canvas.width
}

/// Vertical pixel offset produced by a tilt angle.
pub fn tilt_offset_px(tilt_deg: f64, canvas: CanvasSize) -> f64 {
    tilt_deg / 360.0 * canvas.height
}

fn wrap_x(x: f64, width: f64) -> f64 {
    let w = x.rem_euclid(width);
    if w >= width { 0.0 } else { w }
}

/// Projects a neutral spherical position onto the canvas under `view`.
///
/// Out-of-range input is clamped to `[-180, 180]` first. `x` is wrapped into
/// `[0, width)`. `y` is left unclamped: under tilt or roll it may leave the
/// canvas, and visibility is the renderer's decision.
pub fn to_planar(s: Spherical, view: ViewRotation, canvas: CanvasSize) -> Vec2 {
    let s = clamp_spherical(s);
    let image_x = (s.phi + 180.0) / 360.0 * canvas.width;
    let image_y = (s.theta + 180.0) / 360.0 * canvas.height;

    let mut p = Vec2::new(
        image_x - pan_offset_px(view.y, canvas),
        image_y - tilt_offset_px(view.x, canvas),
    );
    if view.z != 0.0 {
        p = rotate_about(p, canvas.center(), view.z);
    }

    Vec2::new(wrap_x(p.x, canvas.width), p.y)
}

/// Inverse of [`to_planar`]: recovers the neutral spherical position under a
/// canvas point.
///
/// Undoes roll first, then the pan/tilt offset. The result is clamped to
/// `[-180, 180]` and rounded to one decimal, ready to be stored.
pub fn to_spherical(p: Vec2, view: ViewRotation, canvas: CanvasSize) -> Spherical {
    let unrolled = if view.z != 0.0 {
        rotate_about(p, canvas.center(), -view.z)
    } else {
        p
    };

    let image_x = wrap_x(unrolled.x + pan_offset_px(view.y, canvas), canvas.width);
    let image_y = unrolled.y + tilt_offset_px(view.x, canvas);

    Spherical::new(
        image_x / canvas.width * 360.0 - 180.0,
        image_y / canvas.height * 360.0 - 180.0,
    )
    .normalized()
}

/// A view rotation bound to a canvas size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlanarProjection {
    pub view: ViewRotation,
    pub canvas: CanvasSize,
}

impl PlanarProjection {
    pub fn new(view: ViewRotation, canvas: CanvasSize) -> Self {
        Self { view, canvas }
    }

    #[inline]
    pub fn to_planar(&self, s: Spherical) -> Vec2 {
        to_planar(s, self.view, self.canvas)
    }

    #[inline]
    pub fn to_spherical(&self, p: Vec2) -> Spherical {
        to_spherical(p, self.view, self.canvas)
    }
}
