//! Intersection algorithms for boxes and rays
//!
//! Everything here is a pure function of its inputs. Overlap tests are
//! inclusive: boxes that merely touch overlap.

use crate::foundation::math::Vec3;
use super::primitives::{Aabb, Ray};

/// How a ray treats a hit at its very start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayMode {
    /// Line-of-sight queries: a hit at distance 0 counts
    Visibility,
    /// Movement tests: a hit at distance 0 is the mover touching itself
    /// where it stands, and is ignored
    Collision,
}

/// Result of a ray-vs-box test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayBoxHit {
    /// Distance along the ray (0 when the ray starts inside the box)
    pub distance: f32,
    /// World-space hit location
    pub location: Vec3,
}

/// Result of a swept box test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Distance the mover's center travels before contact
    pub distance: f32,
    /// Mover's center at the moment of contact
    pub center: Vec3,
    /// Contact point on the target's surface
    pub contact_point: Vec3,
    /// Outward normal of the target face that was hit
    pub normal: Vec3,
}

/// True when `point` lies within the box, bounds included
pub fn point_in_box(aabb: &Aabb, point: Vec3) -> bool {
    let min = aabb.min();
    let max = aabb.max();
    (0..3).all(|axis| point[axis] >= min[axis] && point[axis] <= max[axis])
}

/// True when two boxes overlap
///
/// Checked by testing whether the origin lies inside their Minkowski
/// difference, which makes the test symmetric.
pub fn boxes_overlap(a: &Aabb, b: &Aabb) -> bool {
    point_in_box(&Aabb::minkowski_difference(a, b), Vec3::zeros())
}

/// Shortest displacement of `a` that brings it onto `b`'s surface
///
/// The vector from the Minkowski difference's surface to the origin. Only
/// meaningful when the boxes overlap.
pub fn minkowski_push_out(a: &Aabb, b: &Aabb) -> Vec3 {
    -Aabb::minkowski_difference(a, b).point_on_perimeter(Vec3::zeros())
}

/// Slab test of a finite ray against a box
///
/// Zero direction components are fine: the reciprocal turns into a signed
/// infinity and the min/max reduction discards that axis.
pub fn ray_box(ray: &Ray, aabb: &Aabb, mode: RayMode) -> Option<RayBoxHit> {
    if ray.length <= 0.0 {
        return None;
    }

    let inv_dir = Vec3::new(1.0 / ray.direction.x, 1.0 / ray.direction.y, 1.0 / ray.direction.z);
    let min = aabb.min();
    let max = aabb.max();

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let t1 = (min[axis] - ray.origin[axis]) * inv_dir[axis];
        let t2 = (max[axis] - ray.origin[axis]) * inv_dir[axis];
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
    }

    if t_near > t_far || t_far < 0.0 || t_near > ray.length {
        return None;
    }
    if mode == RayMode::Collision && (t_near == 0.0 || t_far == 0.0) {
        return None;
    }

    let distance = t_near.max(0.0);
    Some(RayBoxHit {
        distance,
        location: ray.point_at(distance),
    })
}

/// Swept test of `mover` travelling to `destination` against a static box
///
/// The target is inflated by the mover's half-extents and the mover's
/// center is cast against it as a collision ray. A mover that does not move
/// never hits.
pub fn sweep_box(mover: &Aabb, destination: Vec3, target: &Aabb) -> Option<SweepHit> {
    if destination == mover.center {
        return None;
    }

    let inflated = target.inflated(mover);
    let ray = Ray::from_start_end(mover.center, destination);
    let hit = ray_box(&ray, &inflated, RayMode::Collision)?;

    let leading_edge = hit.location + ray.direction.component_mul(&mover.half_extents);
    Some(SweepHit {
        distance: hit.distance,
        center: hit.location,
        contact_point: target.point_on_perimeter(leading_edge),
        normal: inflated.normal_at(hit.location),
    })
}

/// Swept test of two moving boxes, in the frame of `b`
///
/// `a` and `b` are the boxes at the start of the frame.
pub fn sweep_boxes(a: &Aabb, a_displacement: Vec3, b: &Aabb, b_displacement: Vec3) -> Option<SweepHit> {
    sweep_box(a, a.center + a_displacement - b_displacement, b)
}
