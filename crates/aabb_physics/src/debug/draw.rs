//! Debug drawing primitives and system
//!
//! The physics world never renders anything itself. It describes wireframe
//! boxes and raycast lines through the [`DebugDraw`] trait, which the
//! rendering layer implements. [`DebugDrawSystem`] is a ready-made
//! implementation that simply collects the shapes.

use crate::foundation::math::{Vec3, Vec4};

/// Sink for debug geometry emitted by the physics world
pub trait DebugDraw {
    /// Draw a wireframe axis-aligned box
    fn draw_box(&mut self, center: Vec3, half_extents: Vec3, color: Vec4);

    /// Draw a line segment
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4);
}

/// Debug shape primitives that can be rendered for visualization
#[derive(Clone, Debug, PartialEq)]
pub enum DebugShape {
    /// Line segment from start to end
    Line {
        /// Segment start
        start: Vec3,
        /// Segment end
        end: Vec3,
        /// RGBA color
        color: Vec4,
        /// Remaining lifetime in seconds
        duration: f32,
    },

    /// Wireframe AABB at center with half-extents
    Box {
        /// Box center
        center: Vec3,
        /// Box half-extents
        half_extents: Vec3,
        /// RGBA color
        color: Vec4,
        /// Remaining lifetime in seconds
        duration: f32,
    },
}

impl DebugShape {
    /// Get remaining duration
    pub fn duration(&self) -> f32 {
        match self {
            DebugShape::Line { duration, .. } | DebugShape::Box { duration, .. } => *duration,
        }
    }

    /// Color the shape is drawn with
    pub fn color(&self) -> Vec4 {
        match self {
            DebugShape::Line { color, .. } | DebugShape::Box { color, .. } => *color,
        }
    }

    /// Decrease duration by delta_time, returns true if expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        match self {
            DebugShape::Line { duration, .. } | DebugShape::Box { duration, .. } => {
                *duration -= delta_time;
                *duration <= 0.0
            }
        }
    }
}

/// Debug drawing system collecting shapes for the renderer
///
/// Shapes drawn through [`DebugDraw`] live until the next [`update`] call,
/// so a renderer can call `PhysicsWorld::draw_debug` once per frame and
/// consume [`shapes`] afterwards.
///
/// [`update`]: DebugDrawSystem::update
/// [`shapes`]: DebugDrawSystem::shapes
pub struct DebugDrawSystem {
    shapes: Vec<DebugShape>,

    /// Master enable/disable flag
    pub enabled: bool,
}

impl DebugDrawSystem {
    /// Create a new debug draw system
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            enabled: true,
        }
    }

    /// Draw a line segment that stays visible for `duration` seconds
    pub fn draw_line_for(&mut self, start: Vec3, end: Vec3, color: Vec4, duration: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.push(DebugShape::Line {
            start,
            end,
            color,
            duration,
        });
    }

    /// Draw a box that stays visible for `duration` seconds
    pub fn draw_box_for(&mut self, center: Vec3, half_extents: Vec3, color: Vec4, duration: f32) {
        if !self.enabled {
            return;
        }

        self.shapes.push(DebugShape::Box {
            center,
            half_extents,
            color,
            duration,
        });
    }

    /// Update shape lifetimes and remove expired shapes
    pub fn update(&mut self, delta_time: f32) {
        self.shapes.retain_mut(|shape| !shape.tick(delta_time));
    }

    /// Get all shapes for rendering
    pub fn shapes(&self) -> &[DebugShape] {
        if !self.enabled {
            return &[];
        }

        &self.shapes
    }

    /// Get the number of active shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Clear all shapes
    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugDraw for DebugDrawSystem {
    fn draw_box(&mut self, center: Vec3, half_extents: Vec3, color: Vec4) {
        self.draw_box_for(center, half_extents, color, 0.0);
    }

    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        self.draw_line_for(start, end, color, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_shapes_expire_on_next_update() {
        let mut system = DebugDrawSystem::new();
        system.draw_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Vec4::new(0.0, 1.0, 0.0, 1.0));
        system.draw_line(Vec3::zeros(), Vec3::new(0.0, 0.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));

        assert_eq!(system.shape_count(), 2);

        system.update(1.0 / 60.0);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_timed_shape_expiration() {
        let mut system = DebugDrawSystem::new();
        system.draw_line_for(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec4::new(1.0, 0.0, 0.0, 1.0), 1.0);

        system.update(0.5);
        assert_eq!(system.shape_count(), 1);

        system.update(0.6);
        assert_eq!(system.shape_count(), 0);
    }

    #[test]
    fn test_disabled_system_collects_nothing() {
        let mut system = DebugDrawSystem::new();
        system.enabled = false;
        system.draw_box(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(system.shape_count(), 0);
        assert!(system.shapes().is_empty());
    }
}
