//! Collision response for moving boxes
//!
//! Computes how far a body must be pushed back so that, once its
//! anticipated movement is applied, it no longer overlaps what it hit.
//! The functions work on plain boxes so the world can feed them whatever
//! its components currently hold.

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::foundation::math::{clamp_to_normal, normalize_or_zero, up, Vec3};
use super::collision::intersect::{boxes_overlap, minkowski_push_out, sweep_box, sweep_boxes};
use super::collision::Aabb;

/// How a body must react to a collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionResponse {
    /// Displacement to add to the body's anticipated movement
    pub repulsion: Vec3,
    /// Contact point in world space
    pub impact_point: Vec3,
    /// Normal of the surface that was hit
    pub impact_normal: Vec3,
}

/// A box about to move this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingBox {
    /// World box at the start of the movement
    pub aabb: Aabb,
    /// Anticipated movement for this frame
    pub movement: Vec3,
    /// Height of ledges the body walks onto instead of being blocked
    pub step_height: f32,
    /// Share of the push-out this body receives against other bodies
    pub weight: f32,
}

impl MovingBox {
    /// Where the box ends up if nothing stops it
    pub fn destination(&self) -> Aabb {
        self.aabb.translated(self.movement)
    }
}

/// Tolerances used while resolving
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseSettings {
    /// Distance added to every push-out so resolved boxes stop touching
    pub separation_skin: f32,
    /// Clearance added above a ledge when testing a step-up destination
    pub step_epsilon: f32,
}

impl Default for ResponseSettings {
    fn default() -> Self {
        Self::from(&PhysicsConfig::default())
    }
}

impl From<&PhysicsConfig> for ResponseSettings {
    fn from(config: &PhysicsConfig) -> Self {
        Self {
            separation_skin: config.separation_skin,
            step_epsilon: config.step_epsilon,
        }
    }
}

/// Resolve a moving body against a static box
///
/// With `ccd` the body is swept from its current position along its
/// movement; otherwise only the destination is tested. `is_free` reports
/// whether a box is clear of the rest of the world and decides whether a
/// blocked body may step onto the obstacle.
pub fn collide_body_box<F>(
    body: &MovingBox,
    obstacle: &Aabb,
    ccd: bool,
    settings: &ResponseSettings,
    is_free: F,
) -> Option<CollisionResponse>
where
    F: Fn(&Aabb) -> bool,
{
    let response = if ccd {
        swept_response(body, obstacle, settings)?
    } else {
        discrete_response(body, obstacle, settings)?
    };

    if response.impact_normal.y == 0.0 {
        if let Some(step) = step_up(body, obstacle, settings, is_free) {
            return Some(step);
        }
    }
    Some(response)
}

fn discrete_response(body: &MovingBox, obstacle: &Aabb, settings: &ResponseSettings) -> Option<CollisionResponse> {
    let moved = body.destination();
    if !boxes_overlap(&moved, obstacle) {
        return None;
    }

    let reversed = -normalize_or_zero(body.movement);
    let (repulsion, normal) = if reversed == Vec3::zeros() {
        // nothing to walk back along, take the shortest way out
        let push = minkowski_push_out(&moved, obstacle);
        let normal = axis_normal(push);
        (push, normal)
    } else {
        walk_back(&moved, obstacle, reversed)
    };

    let repulsion = clamp_to_normal(repulsion, normal) + normal * settings.separation_skin;
    Some(CollisionResponse {
        repulsion,
        impact_point: obstacle.point_on_perimeter(moved.center + repulsion),
        impact_normal: normal,
    })
}

/// Distance along `direction` until `moved` leaves `obstacle`, as a
/// displacement, plus the normal of the face it leaves through
fn walk_back(moved: &Aabb, obstacle: &Aabb, direction: Vec3) -> (Vec3, Vec3) {
    let difference = Aabb::minkowski_difference(moved, obstacle);

    let mut exit = f32::INFINITY;
    let mut normal = Vec3::zeros();
    for axis in 0..3 {
        let step = direction[axis];
        if step == 0.0 {
            continue;
        }
        let bound = if step > 0.0 { difference.half_extents[axis] } else { -difference.half_extents[axis] };
        let t = (bound - difference.center[axis]) / step;
        if t < exit {
            exit = t;
            normal = Vec3::zeros();
            normal[axis] = step.signum();
        }
    }

    (direction * exit, normal)
}

fn swept_response(body: &MovingBox, obstacle: &Aabb, settings: &ResponseSettings) -> Option<CollisionResponse> {
    let hit = sweep_box(&body.aabb, body.aabb.center + body.movement, obstacle)?;

    let direction = normalize_or_zero(body.movement);
    let remaining = body.movement.norm() - hit.distance + settings.separation_skin;
    Some(CollisionResponse {
        repulsion: clamp_to_normal(-direction * remaining, hit.normal),
        impact_point: hit.contact_point,
        impact_normal: hit.normal,
    })
}

fn step_up<F>(body: &MovingBox, obstacle: &Aabb, settings: &ResponseSettings, is_free: F) -> Option<CollisionResponse>
where
    F: Fn(&Aabb) -> bool,
{
    let base = body.aabb.min().y;
    let top = obstacle.max().y;
    if base + body.step_height <= top {
        return None;
    }

    let mut lift = top - base;
    if lift < 0.0 {
        return None;
    }
    if body.movement.y < 0.0 {
        lift -= body.movement.y;
    }

    let destination = body.destination().translated(up() * (lift + settings.step_epsilon));
    if !is_free(&destination) {
        return None;
    }

    log::trace!("Stepping up {} onto ledge at {}", lift, top);
    let landing = body.aabb.center + body.movement;
    Some(CollisionResponse {
        repulsion: up() * lift,
        impact_point: Vec3::new(landing.x, top, landing.z),
        impact_normal: up(),
    })
}

/// Resolve two physics-driven, non-CCD bodies against each other
///
/// Both boxes are moved by their anticipated movement; if they overlap,
/// the push-out depth is shared according to weight and each body is
/// pushed back along its own movement. A body that does not move receives
/// no repulsion.
pub fn collide_bodies(a: &MovingBox, b: &MovingBox) -> Option<(CollisionResponse, CollisionResponse)> {
    let moved_a = a.destination();
    let moved_b = b.destination();
    if !boxes_overlap(&moved_a, &moved_b) {
        return None;
    }

    let push = minkowski_push_out(&moved_a, &moved_b);
    let depth = push.norm();
    let normal_a = axis_normal(push);

    let total = a.weight + b.weight;
    let (share_a, share_b) = if total > 0.0 { (b.weight / total, a.weight / total) } else { (0.5, 0.5) };

    Some((
        body_response(a, &moved_a, &moved_b, depth * share_a, normal_a),
        body_response(b, &moved_b, &moved_a, depth * share_b, -normal_a),
    ))
}

fn body_response(body: &MovingBox, moved: &Aabb, other: &Aabb, depth: f32, normal: Vec3) -> CollisionResponse {
    let direction = normalize_or_zero(body.movement);
    CollisionResponse {
        repulsion: clamp_to_normal(-direction * depth, normal),
        impact_point: other.point_on_perimeter(moved.center),
        impact_normal: normal,
    }
}

/// Detect a collision between two CCD bodies
///
/// Detection only: the pair is swept relative to each other, falling back
/// to a discrete test of the current boxes when neither moved relative to
/// the other. `a_start` and `b_start` are the boxes at the start of the
/// frame.
pub fn collide_ccd_bodies(a_start: &Aabb, a_displacement: Vec3, b_start: &Aabb, b_displacement: Vec3) -> bool {
    if a_displacement == b_displacement {
        return boxes_overlap(&a_start.translated(a_displacement), &b_start.translated(b_displacement));
    }
    sweep_boxes(a_start, a_displacement, b_start, b_displacement).is_some()
}

fn axis_normal(push: Vec3) -> Vec3 {
    let mut normal = Vec3::zeros();
    let axis = push.iamax();
    if push[axis] != 0.0 {
        normal[axis] = push[axis].signum();
    }
    normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(center: Vec3, half: f32) -> Aabb {
        Aabb::new(center, Vec3::new(half, half, half))
    }

    fn mover(center: Vec3, half: f32, movement: Vec3) -> MovingBox {
        MovingBox {
            aabb: cube(center, half),
            movement,
            step_height: 0.0,
            weight: 1.0,
        }
    }

    fn always_free(_: &Aabb) -> bool {
        true
    }

    #[test]
    fn test_discrete_repulsion_separates() {
        let wall = cube(Vec3::zeros(), 1.0);
        let cases = [
            mover(Vec3::new(-2.0, 0.0, 0.0), 0.5, Vec3::new(1.0, 0.0, 0.0)),
            mover(Vec3::new(-2.0, 0.3, 0.0), 0.5, Vec3::new(0.9, -0.2, 0.1)),
            mover(Vec3::new(0.0, 2.0, 0.0), 0.5, Vec3::new(0.0, -0.8, 0.0)),
            mover(Vec3::new(1.2, 1.2, 0.0), 0.5, Vec3::new(-0.4, -0.3, 0.0)),
        ];

        for body in cases {
            let response = collide_body_box(&body, &wall, false, &ResponseSettings::default(), always_free).unwrap();
            let resolved = body.destination().translated(response.repulsion);
            assert!(!boxes_overlap(&resolved, &wall), "still overlapping: {:?}", body);
        }
    }

    #[test]
    fn test_discrete_repulsion_only_pushes_along_normal() {
        let wall = cube(Vec3::zeros(), 1.0);
        let body = mover(Vec3::new(-2.0, 0.0, 0.0), 0.5, Vec3::new(1.0, 0.0, 1.0));

        let response = collide_body_box(&body, &wall, false, &ResponseSettings::default(), always_free).unwrap();
        assert_eq!(response.impact_normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(response.repulsion.x, -0.5001, epsilon = 1e-5);
        assert_eq!(response.repulsion.y, 0.0);
        assert_eq!(response.repulsion.z, 0.0);
    }

    #[test]
    fn test_landing_on_floor_pushes_up() {
        let floor = Aabb::from_min_max(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0));
        let body = mover(Vec3::new(0.0, 0.55, 0.0), 0.5, Vec3::new(0.2, -0.1, 0.0));

        let response = collide_body_box(&body, &floor, false, &ResponseSettings::default(), always_free).unwrap();
        assert_eq!(response.impact_normal, up());
        assert_relative_eq!(response.repulsion.y, 0.0501, epsilon = 1e-5);
        assert_eq!(response.repulsion.x, 0.0);
    }

    #[test]
    fn test_resting_overlap_without_movement() {
        let wall = cube(Vec3::zeros(), 1.0);
        let body = mover(Vec3::new(1.25, 0.0, 0.0), 0.5, Vec3::zeros());

        let response = collide_body_box(&body, &wall, false, &ResponseSettings::default(), always_free).unwrap();
        assert_eq!(response.impact_normal, Vec3::new(1.0, 0.0, 0.0));
        assert!(!boxes_overlap(&body.aabb.translated(response.repulsion), &wall));
    }

    #[test]
    fn test_no_response_without_overlap() {
        let wall = cube(Vec3::zeros(), 1.0);
        let body = mover(Vec3::new(-5.0, 0.0, 0.0), 0.5, Vec3::new(1.0, 0.0, 0.0));
        assert!(collide_body_box(&body, &wall, false, &ResponseSettings::default(), always_free).is_none());
    }

    #[test]
    fn test_ccd_stops_tunneling_body() {
        let wall = cube(Vec3::zeros(), 1.0);
        let body = mover(Vec3::new(-5.0, 0.0, 0.0), 0.5, Vec3::new(10.0, 0.0, 0.0));

        assert!(collide_body_box(&body, &wall, false, &ResponseSettings::default(), always_free).is_none());

        let response = collide_body_box(&body, &wall, true, &ResponseSettings::default(), always_free).unwrap();
        assert_relative_eq!(response.repulsion, Vec3::new(-6.5001, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(response.impact_point, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(response.impact_normal, Vec3::new(-1.0, 0.0, 0.0));

        let resolved = body.destination().translated(response.repulsion);
        assert!(!boxes_overlap(&resolved, &wall));
    }

    #[test]
    fn test_step_up_onto_low_ledge() {
        // body resting on y = 0, ledge top at 0.2, step height 0.3
        let ledge = Aabb::from_min_max(Vec3::new(0.0, -1.0, -1.0), Vec3::new(2.0, 0.2, 1.0));
        let body = MovingBox {
            aabb: cube(Vec3::new(-0.55, 0.5, 0.0), 0.5),
            movement: Vec3::new(0.1, 0.0, 0.0),
            step_height: 0.3,
            weight: 1.0,
        };

        let response = collide_body_box(&body, &ledge, false, &ResponseSettings::default(), always_free).unwrap();
        assert_relative_eq!(response.repulsion, Vec3::new(0.0, 0.2, 0.0), epsilon = 1e-6);
        assert_eq!(response.impact_normal, up());
    }

    #[test]
    fn test_step_up_blocked_when_destination_is_occupied() {
        let ledge = Aabb::from_min_max(Vec3::new(0.0, -1.0, -1.0), Vec3::new(2.0, 0.2, 1.0));
        let body = MovingBox {
            aabb: cube(Vec3::new(-0.55, 0.5, 0.0), 0.5),
            movement: Vec3::new(0.1, 0.0, 0.0),
            step_height: 0.3,
            weight: 1.0,
        };

        let response = collide_body_box(&body, &ledge, false, &ResponseSettings::default(), |_| false).unwrap();
        assert_eq!(response.impact_normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(response.repulsion.y, 0.0);
    }

    #[test]
    fn test_too_high_ledge_blocks() {
        let wall = Aabb::from_min_max(Vec3::new(0.0, -1.0, -1.0), Vec3::new(2.0, 0.5, 1.0));
        let body = MovingBox {
            aabb: cube(Vec3::new(-0.55, 0.5, 0.0), 0.5),
            movement: Vec3::new(0.1, 0.0, 0.0),
            step_height: 0.3,
            weight: 1.0,
        };

        let response = collide_body_box(&body, &wall, false, &ResponseSettings::default(), always_free).unwrap();
        assert_eq!(response.impact_normal, Vec3::new(-1.0, 0.0, 0.0));
        assert!(response.repulsion.x < 0.0);
    }

    #[test]
    fn test_step_up_cancels_gravity() {
        let ledge = Aabb::from_min_max(Vec3::new(0.0, -1.0, -1.0), Vec3::new(2.0, 0.2, 1.0));
        let body = MovingBox {
            aabb: cube(Vec3::new(-0.55, 0.5, 0.0), 0.5),
            movement: Vec3::new(0.1, -0.05, 0.0),
            step_height: 0.3,
            weight: 1.0,
        };

        let response = collide_body_box(&body, &ledge, false, &ResponseSettings::default(), always_free).unwrap();
        assert_relative_eq!(response.repulsion.y, 0.25, epsilon = 1e-6);
        assert_relative_eq!(body.destination().translated(response.repulsion).min().y, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_weights_share_push_out() {
        // destinations overlap by 0.5 on x
        let a = mover(Vec3::new(-1.0, 0.0, 0.0), 0.5, Vec3::new(0.75, 0.0, 0.0));
        let b = mover(Vec3::new(1.0, 0.0, 0.0), 0.5, Vec3::new(-0.75, 0.0, 0.0));

        let (response_a, response_b) = collide_bodies(&a, &b).unwrap();
        assert_relative_eq!(response_a.repulsion, Vec3::new(-0.25, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(response_b.repulsion, Vec3::new(0.25, 0.0, 0.0), epsilon = 1e-6);
        assert_eq!(response_a.impact_normal, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(response_b.impact_normal, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_heavier_body_is_pushed_less() {
        let light = mover(Vec3::new(-1.0, 0.0, 0.0), 0.5, Vec3::new(0.75, 0.0, 0.0));
        let heavy = MovingBox {
            weight: 3.0,
            ..mover(Vec3::new(1.0, 0.0, 0.0), 0.5, Vec3::new(-0.75, 0.0, 0.0))
        };

        let (response_light, response_heavy) = collide_bodies(&light, &heavy).unwrap();
        assert_relative_eq!(response_light.repulsion.x, -0.375, epsilon = 1e-6);
        assert_relative_eq!(response_heavy.repulsion.x, 0.125, epsilon = 1e-6);
    }

    #[test]
    fn test_idle_body_is_not_pushed() {
        let moving = mover(Vec3::new(-1.0, 0.0, 0.0), 0.5, Vec3::new(1.0, 0.0, 0.0));
        let idle = mover(Vec3::new(0.5, 0.0, 0.0), 0.5, Vec3::zeros());

        let (response_moving, response_idle) = collide_bodies(&moving, &idle).unwrap();
        assert!(response_moving.repulsion.x < 0.0);
        assert_eq!(response_idle.repulsion, Vec3::zeros());
    }

    #[test]
    fn test_ccd_bodies_detection() {
        let a = cube(Vec3::new(-5.0, 0.0, 0.0), 0.5);
        let b = cube(Vec3::new(5.0, 0.0, 0.0), 0.5);
        assert!(collide_ccd_bodies(&a, Vec3::new(10.0, 0.0, 0.0), &b, Vec3::new(-10.0, 0.0, 0.0)));
        assert!(!collide_ccd_bodies(&a, Vec3::new(1.0, 0.0, 0.0), &b, Vec3::new(1.0, 0.0, 0.0)));

        let touching = cube(Vec3::new(-4.2, 0.0, 0.0), 0.5);
        assert!(collide_ccd_bodies(&a, Vec3::zeros(), &touching, Vec3::zeros()));
    }
}
