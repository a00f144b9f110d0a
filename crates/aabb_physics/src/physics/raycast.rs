//! Raycast query types
//!
//! The queries themselves live on the physics world; this module holds the
//! closest-hit accumulator and the persistent debug raycasts.

use crate::foundation::collections::ColliderRef;
use crate::foundation::math::Vec3;
use crate::physics::collision::Ray;
use crate::physics::collision_channels::TestChannels;

/// Closest hit found so far by a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHitInfos {
    /// Distance along the ray, infinite while nothing was hit
    pub distance: f32,
    /// Where the ray hit
    pub location: Vec3,
    /// Surface normal at the hit
    pub normal: Vec3,
    /// What was hit
    pub collider: Option<ColliderRef>,
}

impl RaycastHitInfos {
    /// An accumulator that has not hit anything
    pub fn new() -> Self {
        Self {
            distance: f32::INFINITY,
            location: Vec3::zeros(),
            normal: Vec3::zeros(),
            collider: None,
        }
    }

    /// Record a candidate hit, kept only when strictly closer
    pub fn offer(&mut self, distance: f32, location: Vec3, normal: Vec3, collider: ColliderRef) -> bool {
        if distance >= self.distance {
            return false;
        }

        self.distance = distance;
        self.location = location;
        self.normal = normal;
        self.collider = Some(collider);
        true
    }

    /// Whether anything was hit
    pub fn is_hit(&self) -> bool {
        self.collider.is_some()
    }
}

impl Default for RaycastHitInfos {
    fn default() -> Self {
        Self::new()
    }
}

/// A raycast retested every frame until its timer runs out
#[derive(Debug, Clone, PartialEq)]
pub struct DebugRaycast {
    /// The ray being tested
    pub ray: Ray,
    /// Channels it tests against
    pub test_channels: TestChannels,
    /// Seconds the raycast stays alive
    pub duration: f32,
    /// Seconds elapsed since it was cast
    pub timer: f32,
    /// Result of the latest test
    pub last_hit: RaycastHitInfos,
}

impl DebugRaycast {
    /// Create a raycast living for `duration` seconds
    pub fn new(ray: Ray, test_channels: TestChannels, duration: f32) -> Self {
        Self {
            ray,
            test_channels,
            duration,
            timer: 0.0,
            last_hit: RaycastHitInfos::new(),
        }
    }

    /// Advance the timer, returns true once expired
    pub fn tick(&mut self, delta_time: f32) -> bool {
        self.timer += delta_time;
        self.timer >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::{CollisionHandle, RigidbodyHandle};

    #[test]
    fn test_only_strictly_closer_hits_replace() {
        let first = ColliderRef::Collision(CollisionHandle::default());
        let second = ColliderRef::Rigidbody(RigidbodyHandle::default());

        let mut hit = RaycastHitInfos::new();
        assert!(!hit.is_hit());
        assert!(hit.offer(5.0, Vec3::zeros(), Vec3::zeros(), first));
        assert!(!hit.offer(5.0, Vec3::zeros(), Vec3::zeros(), second));
        assert!(!hit.offer(8.0, Vec3::zeros(), Vec3::zeros(), second));
        assert_eq!(hit.collider, Some(first));

        assert!(hit.offer(2.0, Vec3::zeros(), Vec3::zeros(), second));
        assert_eq!(hit.collider, Some(second));
    }

    #[test]
    fn test_debug_raycast_expires() {
        let ray = Ray::from_start_end(Vec3::zeros(), Vec3::new(0.0, 0.0, 10.0));
        let mut raycast = DebugRaycast::new(ray, TestChannels::ALL, 1.0);
        assert!(!raycast.tick(0.5));
        assert!(raycast.tick(0.5));
    }
}
