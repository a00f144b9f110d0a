//! Math utilities and types
//!
//! Provides the vector types used by the collision code and the placement
//! (`Transform`) that positions a collision shape in the world.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (RGBA colors for debug drawing)
pub type Vec4 = Vector4<f32>;

/// World placement of a collision shape
///
/// Only position and scale are applied to axis-aligned boxes, so rotation
/// is not stored at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Apply this transform to a local-space point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.scale.component_mul(&point)
    }

    /// Apply this transform's scale to a local-space extent
    ///
    /// Extents stay non-negative under mirroring scales.
    pub fn transform_extents(&self, extents: Vec3) -> Vec3 {
        self.scale.abs().component_mul(&extents)
    }
}

/// The world up axis
pub fn up() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// Normalize a vector, leaving the zero vector untouched
///
/// A body that does not move has no direction; callers rely on getting
/// zero back rather than NaNs.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(0.0).unwrap_or_else(Vec3::zeros)
}

/// True when both values are non-zero and share a sign
pub fn same_sign(a: f32, b: f32) -> bool {
    a * b > 0.0
}

/// Zero every component of `repulsion` whose sign disagrees with `normal`
///
/// A repulsion may only push away from the contacted face, never along it.
pub fn clamp_to_normal(mut repulsion: Vec3, normal: Vec3) -> Vec3 {
    for axis in 0..3 {
        if !same_sign(normal[axis], repulsion[axis]) {
            repulsion[axis] = 0.0;
        }
    }
    repulsion
}
