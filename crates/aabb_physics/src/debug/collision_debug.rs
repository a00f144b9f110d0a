//! Collision-specific debug colors
//!
//! Boxes are drawn green while idle and red on any frame they were hit by a
//! collision or a debug raycast. Raycast lines use their own pair of colors.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec4;

/// Color scheme for collision visualization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionDebugColors {
    /// Color for collision shapes (not colliding)
    pub shape_default: Vec4,

    /// Color for collision shapes (intersected this frame)
    pub shape_colliding: Vec4,

    /// Color for a debug raycast that hit something
    pub raycast_hit: Vec4,

    /// Color for a debug raycast that hit nothing
    pub raycast_miss: Vec4,
}

impl Default for CollisionDebugColors {
    fn default() -> Self {
        Self {
            shape_default: Vec4::new(0.0, 1.0, 0.0, 1.0),   // Green
            shape_colliding: Vec4::new(1.0, 0.0, 0.0, 1.0), // Red
            raycast_hit: Vec4::new(1.0, 0.5, 0.0, 1.0),     // Orange
            raycast_miss: Vec4::new(0.0, 1.0, 1.0, 1.0),    // Cyan
        }
    }
}

impl CollisionDebugColors {
    /// Color for a shape given its intersected state
    pub fn shape_color(&self, intersected: bool) -> Vec4 {
        if intersected {
            self.shape_colliding
        } else {
            self.shape_default
        }
    }
}
