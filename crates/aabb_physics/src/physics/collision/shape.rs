//! Collision shapes and the component that places them in a world
//!
//! Shapes are stored in model space and transformed to world space on demand
//! during every test, using the placement kept next to them. Nothing is
//! cached across frames except the CCD last-frame position.

use crate::debug::{CollisionDebugColors, DebugDraw};
use crate::events::{CollisionEvent, RaycastEvent, Signal};
use crate::foundation::collections::ColliderRef;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision_channels::ChannelId;
use crate::physics::raycast::RaycastHitInfos;
use super::intersect::{boxes_overlap, point_in_box, ray_box, sweep_box, RayBoxHit, RayMode, SweepHit};
use super::primitives::{Aabb, Ray};

/// Collision shape types (stored in MODEL SPACE)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    /// An axis-aligned box
    Box(Aabb),
}

impl CollisionShape {
    /// A box centered on the placement's position
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box(Aabb::new(Vec3::zeros(), half_extents))
    }

    /// A box with its own local offset
    pub fn offset_cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::Box(Aabb::new(center, half_extents))
    }

    /// Transform this shape to world space
    ///
    /// Returns a temporary WorldSpaceShape for collision testing.
    pub fn to_world_space(&self, transform: &Transform) -> WorldSpaceShape {
        match self {
            Self::Box(local) => WorldSpaceShape::Box(Aabb::new(
                transform.transform_point(local.center),
                transform.transform_extents(local.half_extents),
            )),
        }
    }
}

/// World-space collision shape (temporary, for testing only)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldSpaceShape {
    /// World-space box
    Box(Aabb),
}

impl WorldSpaceShape {
    /// Smallest box enclosing the shape
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Self::Box(aabb) => *aabb,
        }
    }

    /// Test if a point lies inside this shape
    pub fn contains_point(&self, point: Vec3) -> bool {
        match self {
            Self::Box(aabb) => point_in_box(aabb, point),
        }
    }

    /// Test if this shape intersects with another shape
    pub fn intersects(&self, other: &WorldSpaceShape) -> bool {
        match (self, other) {
            (Self::Box(a), Self::Box(b)) => boxes_overlap(a, b),
        }
    }

    /// Test ray intersection with this shape
    pub fn intersect_ray(&self, ray: &Ray, mode: RayMode) -> Option<RayBoxHit> {
        match self {
            Self::Box(aabb) => ray_box(ray, aabb, mode),
        }
    }

    /// Outward surface normal closest to `point`
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Self::Box(aabb) => aabb.normal_at(point),
        }
    }
}

/// A collision shape placed in a physics world
///
/// Owned either by the world's static registry or by a rigidbody. Resolvers
/// are pure predicates: setting the intersected flag and broadcasting
/// events is left to the world.
#[derive(Debug)]
pub struct CollisionComponent {
    shape: CollisionShape,
    transform: Transform,
    channel: ChannelId,
    use_ccd: bool,
    last_frame_position: Vec3,
    intersected: bool,
    pub(crate) registered: bool,

    /// Fired when something collides with this shape
    pub on_collision_intersect: Signal<CollisionEvent>,
    /// Fired when a raycast's closest hit is this shape
    pub on_raycast_intersect: Signal<RaycastEvent>,
    /// Fired right before the shape leaves its world
    pub on_destroy: Signal<ColliderRef>,
}

impl CollisionComponent {
    /// Create an unregistered component
    pub fn new(shape: CollisionShape, transform: Transform, channel: ChannelId) -> Self {
        Self {
            shape,
            last_frame_position: transform.position,
            transform,
            channel,
            use_ccd: false,
            intersected: false,
            registered: false,
            on_collision_intersect: Signal::new(),
            on_raycast_intersect: Signal::new(),
            on_destroy: Signal::new(),
        }
    }

    /// Enable continuous collision detection (builder pattern)
    pub fn with_ccd(mut self, use_ccd: bool) -> Self {
        self.use_ccd = use_ccd;
        self
    }

    /// Model-space shape
    pub fn shape(&self) -> &CollisionShape {
        &self.shape
    }

    /// Replace the model-space shape
    pub fn set_shape(&mut self, shape: CollisionShape) {
        self.shape = shape;
    }

    /// Current placement
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Replace the placement
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Move the shape without touching its scale
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Channel this shape belongs to
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Move the shape to another channel
    pub fn set_channel(&mut self, channel: ChannelId) {
        self.channel = channel;
    }

    /// Whether swept tests are used for this shape
    pub fn use_ccd(&self) -> bool {
        self.use_ccd
    }

    /// Toggle swept tests
    pub fn set_use_ccd(&mut self, use_ccd: bool) {
        self.use_ccd = use_ccd;
    }

    /// Position committed at the end of the previous frame
    pub fn last_frame_position(&self) -> Vec3 {
        self.last_frame_position
    }

    pub(crate) fn commit_last_frame_position(&mut self) {
        self.last_frame_position = self.transform.position;
    }

    /// Whether anything hit this shape during the current frame
    pub fn is_intersected(&self) -> bool {
        self.intersected
    }

    /// Mark the shape as hit for the rest of the frame
    pub fn force_intersected(&mut self) {
        self.intersected = true;
    }

    pub(crate) fn clear_intersected(&mut self) {
        self.intersected = false;
    }

    /// Whether the shape currently lives in a world
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// The shape placed in the world
    pub fn world_shape(&self) -> WorldSpaceShape {
        self.shape.to_world_space(&self.transform)
    }

    /// World-space bounding box
    pub fn world_box(&self) -> Aabb {
        self.world_shape().bounding_box()
    }

    /// World-space bounding box at the last committed position
    pub fn last_frame_box(&self) -> Aabb {
        self.world_box().translated(self.last_frame_position - self.transform.position)
    }

    /// Displacement since the last committed position
    pub fn frame_displacement(&self) -> Vec3 {
        self.transform.position - self.last_frame_position
    }

    /// Test whether `point` lies in the shape
    pub fn resolve_point(&self, point: Vec3) -> bool {
        self.world_shape().contains_point(point)
    }

    /// Test a ray against the shape, recording it in `best` when closer
    ///
    /// Returns whether the ray hits the shape at all.
    pub fn resolve_raycast(&self, ray: &Ray, collider: ColliderRef, best: &mut RaycastHitInfos) -> bool {
        let shape = self.world_shape();
        let Some(hit) = shape.intersect_ray(ray, RayMode::Visibility) else {
            return false;
        };

        best.offer(hit.distance, hit.location, shape.normal_at(hit.location), collider);
        true
    }

    /// Discrete overlap test
    pub fn resolve_collision(&self, other: &CollisionComponent) -> bool {
        self.world_shape().intersects(&other.world_shape())
    }

    /// Swept overlap test
    ///
    /// The mover (`self` when `self_is_mover`) sweeps from its last-frame
    /// position to its current one; the other shape stays where it is now.
    pub fn resolve_collision_ccd(&self, other: &CollisionComponent, self_is_mover: bool) -> bool {
        let (mover, target) = if self_is_mover { (self, other) } else { (other, self) };
        mover.sweep_against(&target.world_box()).is_some()
    }

    /// Sweep this shape's last-frame box to its current position against `target`
    pub fn sweep_against(&self, target: &Aabb) -> Option<SweepHit> {
        sweep_box(&self.last_frame_box(), self.world_box().center, target)
    }

    /// Draw the shape's wireframe, red when hit this frame
    pub fn draw_debug(&self, drawer: &mut dyn DebugDraw, colors: &CollisionDebugColors) {
        let aabb = self.world_box();
        drawer.draw_box(aabb.center, aabb.half_extents, colors.shape_color(self.intersected));
    }
}
