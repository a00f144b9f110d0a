//! Primitive collision shapes
//!
//! Provides the axis-aligned box and the ray every algorithm of this crate
//! works on. Both are plain values in world space (or model space, for the
//! box stored by a shape).

use crate::foundation::math::{normalize_or_zero, Vec3};

/// An axis-aligned box described by its center and half-extents
///
/// Half-extents must be non-negative on every axis; nothing checks it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Center of the box
    pub center: Vec3,
    /// Half the size of the box on each axis
    pub half_extents: Vec3,
}

impl Aabb {
    /// Creates a box from its center and half-extents
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }

    /// Creates a box spanning two corners
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            half_extents: (max - min) * 0.5,
        }
    }

    /// A box centered on the origin with half-extents of one
    pub fn unit() -> Self {
        Self::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }

    /// Lowest corner
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    /// Highest corner
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Copy of this box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.center + offset, self.half_extents)
    }

    /// Copy of this box grown by another box's half-extents on every axis
    pub fn inflated(&self, other: &Aabb) -> Self {
        Self::new(self.center, self.half_extents + other.half_extents)
    }

    /// Minkowski difference `a - b`
    ///
    /// The two boxes overlap exactly when the result contains the origin.
    pub fn minkowski_difference(a: &Aabb, b: &Aabb) -> Self {
        Self::new(a.center - b.center, a.half_extents + b.half_extents)
    }

    /// Closest point of the box surface to `point`
    ///
    /// Points outside are clamped onto the box; points inside are pushed to
    /// the nearest face.
    pub fn point_on_perimeter(&self, point: Vec3) -> Vec3 {
        let min = self.min();
        let max = self.max();

        let mut clamped = Vec3::new(
            point.x.max(min.x).min(max.x),
            point.y.max(min.y).min(max.y),
            point.z.max(min.z).min(max.z),
        );
        if clamped != point {
            return clamped;
        }

        let mut best_distance = f32::INFINITY;
        let mut best_axis = 0;
        let mut best_value = min.x;
        for axis in 0..3 {
            let to_min = point[axis] - min[axis];
            if to_min < best_distance {
                best_distance = to_min;
                best_axis = axis;
                best_value = min[axis];
            }
            let to_max = max[axis] - point[axis];
            if to_max < best_distance {
                best_distance = to_max;
                best_axis = axis;
                best_value = max[axis];
            }
        }
        clamped[best_axis] = best_value;
        clamped
    }

    /// Outward normal of the face closest to `point`
    ///
    /// Meant for points on or near the surface; ties between faces favor
    /// the x axis, then y.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        let local = point - self.center;

        let mut best_axis = 0;
        let mut best_gap = f32::INFINITY;
        for axis in 0..3 {
            let gap = (local[axis].abs() - self.half_extents[axis]).abs();
            if gap < best_gap {
                best_gap = gap;
                best_axis = axis;
            }
        }

        let mut normal = Vec3::zeros();
        normal[best_axis] = if local[best_axis] >= 0.0 { 1.0 } else { -1.0 };
        normal
    }
}

/// A finite ray (segment) for raycasts and swept tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized, or zero for a degenerate ray)
    pub direction: Vec3,
    /// How far the ray reaches from its origin
    pub length: f32,
}

impl Ray {
    /// Creates a new ray with the given origin, direction and length
    pub fn new(origin: Vec3, direction: Vec3, length: f32) -> Self {
        Self {
            origin,
            direction: normalize_or_zero(direction),
            length,
        }
    }

    /// Creates the ray going from `start` to `end`
    pub fn from_start_end(start: Vec3, end: Vec3) -> Self {
        let delta = end - start;
        Self {
            origin: start,
            direction: normalize_or_zero(delta),
            length: delta.norm(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The far end of the ray
    pub fn end(&self) -> Vec3 {
        self.point_at(self.length)
    }
}
