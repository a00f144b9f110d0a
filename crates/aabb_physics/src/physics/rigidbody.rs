//! Rigidbody component
//!
//! A rigidbody wraps one [`CollisionComponent`] and gives it motion:
//! velocity, accumulated gravity, weight against other bodies and a step
//! height for walking onto ledges. Each frame the world turns velocity into
//! an anticipated movement, lets every collision push that movement back,
//! then applies what is left.

use bitflags::bitflags;

use crate::events::{CollisionEvent, RepulsionEvent, Signal};
use crate::foundation::collections::ColliderRef;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::CollisionComponent;
use crate::physics::collision_channels::TestChannels;
use crate::physics::response::{CollisionResponse, MovingBox};

bitflags! {
    /// Behavior switches of a rigidbody
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BodyFlags: u8 {
        /// Collisions push the body back and the world moves it
        const PHYSICS_ACTIVE = 1 << 0;
        /// Gravity accumulates into the body's velocity
        const USE_GRAVITY = 1 << 1;
        /// Swept tests replace discrete ones
        const USE_CCD = 1 << 2;
    }
}

impl Default for BodyFlags {
    fn default() -> Self {
        Self::PHYSICS_ACTIVE | Self::USE_GRAVITY
    }
}

/// A moving participant of a physics world
#[derive(Debug)]
pub struct RigidbodyComponent {
    collision: CollisionComponent,
    flags: BodyFlags,
    test_channels: TestChannels,
    velocity: Vec3,
    gravity_velocity: Vec3,
    anticipated_movement: Vec3,
    weight: f32,
    step_height: f32,
    on_ground: bool,
    landed: bool,
    pub(crate) registered: bool,

    /// Fired when the body collides with anything
    pub on_collision_intersect: Signal<CollisionEvent>,
    /// Fired when a collision pushes the body back
    pub on_collision_repulsed: Signal<RepulsionEvent>,
    /// Fired right before the body leaves its world
    pub on_destroy: Signal<ColliderRef>,
}

impl RigidbodyComponent {
    /// Wrap a collision component with default flags, weight 1 and no step height
    pub fn new(collision: CollisionComponent) -> Self {
        let mut body = Self {
            collision,
            flags: BodyFlags::default(),
            test_channels: TestChannels::default(),
            velocity: Vec3::zeros(),
            gravity_velocity: Vec3::zeros(),
            anticipated_movement: Vec3::zeros(),
            weight: 1.0,
            step_height: 0.0,
            on_ground: false,
            landed: false,
            registered: false,
            on_collision_intersect: Signal::new(),
            on_collision_repulsed: Signal::new(),
            on_destroy: Signal::new(),
        };
        body.flags.set(BodyFlags::USE_CCD, body.collision.use_ccd());
        body
    }

    /// Replace the flags (builder pattern)
    pub fn with_flags(mut self, flags: BodyFlags) -> Self {
        self.set_flags(flags);
        self
    }

    /// Set the channels tested against (builder pattern)
    pub fn with_test_channels(mut self, test_channels: TestChannels) -> Self {
        self.test_channels = test_channels;
        self
    }

    /// Set the weight (builder pattern)
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the step height (builder pattern)
    pub fn with_step_height(mut self, step_height: f32) -> Self {
        self.step_height = step_height;
        self
    }

    /// Set the initial velocity (builder pattern)
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// The wrapped collision component
    pub fn collision(&self) -> &CollisionComponent {
        &self.collision
    }

    /// Mutable access to the wrapped collision component
    pub fn collision_mut(&mut self) -> &mut CollisionComponent {
        &mut self.collision
    }

    /// Current flags
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Replace the flags
    pub fn set_flags(&mut self, flags: BodyFlags) {
        self.flags = flags;
        self.collision.set_use_ccd(flags.contains(BodyFlags::USE_CCD));
    }

    /// Whether collisions push this body back
    pub fn is_physics_active(&self) -> bool {
        self.flags.contains(BodyFlags::PHYSICS_ACTIVE)
    }

    /// Toggle collision response
    pub fn set_physics_active(&mut self, active: bool) {
        self.flags.set(BodyFlags::PHYSICS_ACTIVE, active);
    }

    /// Whether gravity applies
    pub fn use_gravity(&self) -> bool {
        self.flags.contains(BodyFlags::USE_GRAVITY)
    }

    /// Toggle gravity; disabling it drops the accumulated gravity velocity
    pub fn set_use_gravity(&mut self, use_gravity: bool) {
        self.flags.set(BodyFlags::USE_GRAVITY, use_gravity);
        if !use_gravity {
            self.gravity_velocity = Vec3::zeros();
        }
    }

    /// Whether swept tests are used
    pub fn use_ccd(&self) -> bool {
        self.flags.contains(BodyFlags::USE_CCD)
    }

    /// Toggle swept tests
    pub fn set_use_ccd(&mut self, use_ccd: bool) {
        self.flags.set(BodyFlags::USE_CCD, use_ccd);
        self.collision.set_use_ccd(use_ccd);
    }

    /// Channels this body tests against
    pub fn test_channels(&self) -> TestChannels {
        self.test_channels
    }

    /// Replace the channels this body tests against
    pub fn set_test_channels(&mut self, test_channels: TestChannels) {
        self.test_channels = test_channels;
    }

    /// Velocity set by game code (units / s)
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Replace the velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Velocity accumulated from gravity
    pub fn gravity_velocity(&self) -> Vec3 {
        self.gravity_velocity
    }

    /// Add to the gravity velocity, e.g. a jump impulse
    pub fn add_gravity_velocity(&mut self, impulse: Vec3) {
        self.gravity_velocity += impulse;
    }

    /// Movement the body will make this frame, as resolved so far
    pub fn anticipated_movement(&self) -> Vec3 {
        self.anticipated_movement
    }

    /// Weight against other bodies
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Replace the weight
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// Height of ledges the body walks onto
    pub fn step_height(&self) -> f32 {
        self.step_height
    }

    /// Replace the step height
    pub fn set_step_height(&mut self, step_height: f32) {
        self.step_height = step_height;
    }

    /// Whether something held the body up during the last frame
    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether the body currently lives in a world
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.collision.position()
    }

    /// Teleport the body
    ///
    /// The last-frame position is moved too, so CCD does not sweep across
    /// the jump.
    pub fn set_position(&mut self, position: Vec3) {
        self.collision.set_position(position);
        self.collision.commit_last_frame_position();
    }

    /// Move the body like game code driving a kinematic object would
    ///
    /// Unlike [`set_position`](Self::set_position) the last-frame position
    /// is kept, so a CCD body sweeps along the move.
    pub fn move_to(&mut self, position: Vec3) {
        self.collision.set_position(position);
    }

    /// Current placement
    pub fn transform(&self) -> &Transform {
        self.collision.transform()
    }

    pub(crate) fn moving_box(&self) -> MovingBox {
        MovingBox {
            aabb: self.collision.world_box(),
            movement: self.anticipated_movement,
            step_height: self.step_height,
            weight: self.weight,
        }
    }

    /// Turn velocity into this frame's anticipated movement
    pub(crate) fn begin_frame(&mut self, delta_time: f32, gravity: Vec3) {
        self.landed = false;
        if !self.is_physics_active() {
            self.anticipated_movement = Vec3::zeros();
            return;
        }

        if self.use_gravity() {
            self.gravity_velocity += gravity * delta_time;
        }
        self.anticipated_movement = (self.velocity + self.gravity_velocity) * delta_time;
    }

    /// Fold a collision response into the anticipated movement
    pub(crate) fn apply_response(&mut self, response: &CollisionResponse) {
        self.anticipated_movement += response.repulsion;

        if response.repulsion.y > 0.0 {
            self.landed = true;
        } else if response.repulsion.y < 0.0 && self.gravity_velocity.y > 0.0 {
            // head against a ceiling
            self.gravity_velocity.y = 0.0;
        }
    }

    /// Apply the resolved movement and update ground state
    pub(crate) fn integrate(&mut self) {
        if !self.is_physics_active() {
            return;
        }

        let position = self.collision.position() + self.anticipated_movement;
        self.collision.set_position(position);

        self.on_ground = self.landed;
        if self.on_ground && self.gravity_velocity.y < 0.0 {
            self.gravity_velocity = Vec3::zeros();
        }
    }

    pub(crate) fn commit_last_frame_position(&mut self) {
        self.collision.commit_last_frame_position();
    }
}
