use foundation::math::{Spherical, round_to_tenth, wrap_degrees_180};
use serde::{Deserialize, Serialize};

/// Radius stored with every hotspot. Viewers place markers on a sphere of
/// this radius; the editor never changes it.
pub const DEFAULT_LINK_RADIUS: f64 = 10.0;

/// Anchor of a hotspot on its source panorama (degrees, one decimal).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPosition {
    pub phi: f64,
    pub theta: f64,
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    DEFAULT_LINK_RADIUS
}

impl LinkPosition {
    /// Stores a neutral spherical position: clamped and rounded.
    pub fn from_spherical(s: Spherical) -> Self {
        let s = s.normalized();
        Self {
            phi: s.phi,
            theta: s.theta,
            radius: DEFAULT_LINK_RADIUS,
        }
    }

    pub fn spherical(&self) -> Spherical {
        Spherical::new(self.phi, self.theta)
    }

    pub fn normalized(self) -> Self {
        let s = self.spherical().normalized();
        Self {
            phi: s.phi,
            theta: s.theta,
            radius: self.radius,
        }
    }

    /// Deterministic placement for repair-generated links.
    ///
    /// Depends only on the target index so consecutive auto links fan out
    /// horizontally (60 degree steps) and vertically (three 10 degree rows).
    pub fn auto_for_target(to_index: usize) -> Self {
        let step = ((to_index % 6) * 60) as f64;
        let row = ((to_index % 3) * 10) as f64;
        Self {
            phi: round_to_tenth(wrap_degrees_180(-90.0 + step)),
            theta: 90.0 + row,
            radius: DEFAULT_LINK_RADIUS,
        }
    }
}

/// Directed hotspot from one panorama to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationLink {
    pub from_index: usize,
    pub to_index: usize,
    pub position: LinkPosition,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub auto_generated: bool,
}

impl NavigationLink {
    pub fn new(from_index: usize, to_index: usize, position: LinkPosition) -> Self {
        Self {
            from_index,
            to_index,
            position: position.normalized(),
            label: String::new(),
            description: String::new(),
            auto_generated: false,
        }
    }

    /// A link inserted by connectivity repair.
    pub fn auto(from_index: usize, to_index: usize, label: impl Into<String>) -> Self {
        Self {
            from_index,
            to_index,
            position: LinkPosition::auto_for_target(to_index),
            label: label.into(),
            description: String::new(),
            auto_generated: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn touches(&self, index: usize) -> bool {
        self.from_index == index || self.to_index == index
    }
}
