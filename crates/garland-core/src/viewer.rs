//! Viewer description supplied by the render surface each frame.
//!
//! The core never drives the camera; it only reads where the viewer is and
//! which way it looks, to place the focused particle in front of it.

use glam::Vec3;

/// Right-handed look-at description of the render surface's camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewer {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 50.0),
            target: Vec3::new(0.0, 2.0, 0.0),
        }
    }
}

impl Viewer {
    /// Unit view direction; looks down -Z when eye and target coincide.
    pub fn forward(&self) -> Vec3 {
        let dir = (self.target - self.eye).normalize_or_zero();
        if dir == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            dir
        }
    }

    /// World-space point `distance` units ahead of the eye.
    pub fn point_ahead(&self, distance: f32) -> Vec3 {
        self.eye + self.forward() * distance
    }
}
