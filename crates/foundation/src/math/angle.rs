//! Degree helpers shared by projection, rotation and link placement.

use serde::{Deserialize, Serialize};

use super::precision::round_to_tenth;

/// Bound for stored phi/theta, in degrees.
pub const SPHERICAL_LIMIT_DEG: f64 = 180.0;

/// Bound for tilt (`ViewRotation::x`), in degrees.
pub const TILT_LIMIT_DEG: f64 = 90.0;

/// Wraps an angle into `[0, 360)`.
pub fn wrap_degrees_360(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if w >= 360.0 { 0.0 } else { w }
}

/// Wraps an angle into `[-180, 180)`.
pub fn wrap_degrees_180(deg: f64) -> f64 {
    wrap_degrees_360(deg + 180.0) - 180.0
}

pub fn clamp_tilt(deg: f64) -> f64 {
    deg.clamp(-TILT_LIMIT_DEG, TILT_LIMIT_DEG)
}

/// Clamps both angles to `[-180, 180]` without rounding.
pub fn clamp_spherical(s: Spherical) -> Spherical {
    Spherical {
        phi: s.phi.clamp(-SPHERICAL_LIMIT_DEG, SPHERICAL_LIMIT_DEG),
        theta: s.theta.clamp(-SPHERICAL_LIMIT_DEG, SPHERICAL_LIMIT_DEG),
    }
}

/// Neutral spherical angles of a hotspot, in degrees.
///
/// `phi` is longitude (horizontal), `theta` is the vertical coordinate. Both
/// are expressed as if the view rotation were zero.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Spherical {
    pub phi: f64,
    pub theta: f64,
}

impl Spherical {
    pub fn new(phi: f64, theta: f64) -> Self {
        Self { phi, theta }
    }

    /// Clamps both angles to `[-180, 180]` and rounds them to one decimal.
    ///
    /// Out-of-range input is never rejected.
    pub fn normalized(self) -> Self {
        let c = clamp_spherical(self);
        Self {
            phi: round_to_tenth(c.phi),
            theta: round_to_tenth(c.theta),
        }
    }

    /// Smallest absolute difference between two longitudes, in degrees.
    ///
    /// `phi = 180` and `phi = -180` name the same meridian.
    pub fn phi_separation(self, other: Self) -> f64 {
        wrap_degrees_180(self.phi - other.phi).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::{Spherical, clamp_tilt, wrap_degrees_180, wrap_degrees_360};

    #[test]
    fn wrap_360_handles_negatives_and_overflow() {
        assert_eq!(wrap_degrees_360(370.0), 10.0);
        assert_eq!(wrap_degrees_360(-10.0), 350.0);
        assert_eq!(wrap_degrees_360(360.0), 0.0);
        assert!(wrap_degrees_360(-1e-18) < 360.0);
    }

    #[test]
    fn wrap_180_is_half_open() {
        assert_eq!(wrap_degrees_180(210.0), -150.0);
        assert_eq!(wrap_degrees_180(180.0), -180.0);
        assert_eq!(wrap_degrees_180(-90.0), -90.0);
    }

    #[test]
    fn tilt_is_clamped() {
        assert_eq!(clamp_tilt(120.0), 90.0);
        assert_eq!(clamp_tilt(-95.5), -90.0);
        assert_eq!(clamp_tilt(12.0), 12.0);
    }

    #[test]
    fn normalized_clamps_and_rounds() {
        let s = Spherical::new(250.0, -181.26).normalized();
        assert_eq!(s, Spherical::new(180.0, -180.0));

        let s = Spherical::new(12.345, -45.66).normalized();
        assert_eq!(s, Spherical::new(12.3, -45.7));
    }

    #[test]
    fn seam_longitudes_are_the_same_meridian() {
        let a = Spherical::new(180.0, 0.0);
        let b = Spherical::new(-180.0, 0.0);
        assert_eq!(a.phi_separation(b), 0.0);
        assert_eq!(Spherical::new(170.0, 0.0).phi_separation(Spherical::new(-170.0, 0.0)), 20.0);
    }
}
