//! Physics world: registries and the per-frame scheduler
//!
//! The world owns every registered collision, rigidbody and debug raycast.
//! Each call to [`PhysicsWorld::step`] runs the whole pipeline:
//!
//! 0. turn velocities into anticipated movements
//! 1. clear the intersected flags
//! 2. age debug raycasts and drop the expired ones
//! 3. retest debug raycasts, flagging their closest hit
//! 4. test every rigidbody against every static collision
//! 5. test every pair of rigidbodies
//! 6. move physics-driven bodies and commit last-frame positions
//! 7. apply removals requested during the frame
//!
//! Testing is brute force; every body is tested against everything its
//! channels accept.

use crate::config::PhysicsConfig;
use crate::debug::DebugDraw;
use crate::events::{CollisionEvent, RaycastEvent, RemovalQueue, RepulsionEvent};
use crate::foundation::collections::{
    ColliderRef, CollisionHandle, HandleMap, RaycastHandle, RigidbodyHandle,
};
use crate::foundation::math::{Transform, Vec3};
use super::collision::intersect::{boxes_overlap, sweep_box};
use super::collision::{Aabb, CollisionComponent, Ray, SweepHit};
use super::collision_channels::{should_collide, ChannelError, ChannelId, CollisionChannels, TestChannels};
use super::raycast::{DebugRaycast, RaycastHitInfos};
use super::response::{collide_bodies, collide_body_box, collide_ccd_bodies, CollisionResponse, ResponseSettings};
use super::rigidbody::RigidbodyComponent;

/// Half-extents of the marker drawn where a debug raycast hits
const HIT_MARKER_EXTENTS: f32 = 0.05;

/// Outcome of one body tested against one collider
enum Contact {
    /// Touching, nothing to resolve
    Detected,
    /// The body must be pushed back
    Resolved(CollisionResponse),
}

/// Outcome of a pair of bodies
enum PairContact {
    Detected,
    Resolved(CollisionResponse, CollisionResponse),
}

/// Collision world for boxes
pub struct PhysicsWorld {
    config: PhysicsConfig,
    channels: CollisionChannels,
    collisions: HandleMap<CollisionHandle, CollisionComponent>,
    rigidbodies: HandleMap<RigidbodyHandle, RigidbodyComponent>,
    raycasts: HandleMap<RaycastHandle, DebugRaycast>,
    removals: RemovalQueue,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            channels: CollisionChannels::new(),
            collisions: HandleMap::with_key(),
            rigidbodies: HandleMap::with_key(),
            raycasts: HandleMap::with_key(),
            removals: RemovalQueue::new(),
        }
    }

    /// World configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Mutable world configuration, read again on every step
    pub fn config_mut(&mut self) -> &mut PhysicsConfig {
        &mut self.config
    }

    // ---- channels ----

    /// Channel registry
    pub fn channels(&self) -> &CollisionChannels {
        &self.channels
    }

    /// Id of a channel, registering it on first use
    pub fn channel(&mut self, name: &str) -> Result<ChannelId, ChannelError> {
        self.channels.channel(name)
    }

    /// Build a test set from channel names
    pub fn test_set(&mut self, names: &[&str]) -> Result<TestChannels, ChannelError> {
        self.channels.test_set(names)
    }

    /// Register a named test set
    pub fn register_test_channel(&mut self, name: &str, channels: &[&str]) -> Result<TestChannels, ChannelError> {
        self.channels.register_test_channel(name, channels)
    }

    /// Look up a named test set
    pub fn test_channel(&self, name: &str) -> Result<TestChannels, ChannelError> {
        self.channels.test_channel(name)
    }

    // ---- registration ----

    /// Register a static collision
    pub fn create_collision(&mut self, mut collision: CollisionComponent) -> CollisionHandle {
        collision.registered = true;
        let handle = self.collisions.insert(collision);
        log::info!("Registered collision {:?}", handle);
        handle
    }

    /// Register a rigidbody
    pub fn create_rigidbody(&mut self, mut body: RigidbodyComponent) -> RigidbodyHandle {
        body.registered = true;
        body.collision_mut().registered = true;
        body.commit_last_frame_position();
        let handle = self.rigidbodies.insert(body);
        log::info!("Registered rigidbody {:?}", handle);
        handle
    }

    /// Remove a static collision, firing its destroy callbacks
    ///
    /// Returns false (and logs a warning) when the handle is not registered.
    pub fn remove_collision(&mut self, handle: CollisionHandle) -> bool {
        if self.take_collision(handle) {
            return true;
        }
        log::warn!("Tried to remove collision {:?} which is not registered", handle);
        false
    }

    /// Remove a rigidbody, firing its destroy callbacks
    ///
    /// Returns false (and logs a warning) when the handle is not registered.
    pub fn remove_rigidbody(&mut self, handle: RigidbodyHandle) -> bool {
        if self.take_rigidbody(handle) {
            return true;
        }
        log::warn!("Tried to remove rigidbody {:?} which is not registered", handle);
        false
    }

    /// Remove whatever `collider` refers to
    pub fn remove(&mut self, collider: ColliderRef) -> bool {
        match collider {
            ColliderRef::Collision(handle) => self.remove_collision(handle),
            ColliderRef::Rigidbody(handle) => self.remove_rigidbody(handle),
        }
    }

    /// Queue a removal applied at the end of the next step
    pub fn mark_for_removal(&mut self, collider: ColliderRef) {
        self.removals.remove(collider);
    }

    /// Remove everything, firing every destroy callback
    pub fn clear_all(&mut self) {
        log::info!(
            "Clearing physics world ({} collisions, {} rigidbodies, {} raycasts)",
            self.collisions.len(),
            self.rigidbodies.len(),
            self.raycasts.len()
        );

        for (handle, mut collision) in self.collisions.drain() {
            collision.registered = false;
            collision.on_destroy.broadcast(&ColliderRef::Collision(handle), &mut self.removals);
        }
        for (handle, mut body) in self.rigidbodies.drain() {
            body.registered = false;
            body.on_destroy.broadcast(&ColliderRef::Rigidbody(handle), &mut self.removals);
        }
        self.raycasts.clear();

        // everything requested is already gone
        self.removals.drain();
    }

    fn take_collision(&mut self, handle: CollisionHandle) -> bool {
        let Some(mut collision) = self.collisions.remove(handle) else {
            return false;
        };
        collision.registered = false;
        collision.on_destroy.broadcast(&ColliderRef::Collision(handle), &mut self.removals);
        log::info!("Removed collision {:?}", handle);
        true
    }

    fn take_rigidbody(&mut self, handle: RigidbodyHandle) -> bool {
        let Some(mut body) = self.rigidbodies.remove(handle) else {
            return false;
        };
        body.registered = false;
        body.on_destroy.broadcast(&ColliderRef::Rigidbody(handle), &mut self.removals);
        log::info!("Removed rigidbody {:?}", handle);
        true
    }

    fn flush_removals(&mut self) {
        // destroy callbacks may queue more removals
        while !self.removals.is_empty() {
            let (collisions, rigidbodies) = self.removals.drain();
            for handle in collisions {
                self.take_collision(handle);
            }
            for handle in rigidbodies {
                self.take_rigidbody(handle);
            }
        }
    }

    // ---- access ----

    /// A registered static collision
    pub fn collision(&self, handle: CollisionHandle) -> Option<&CollisionComponent> {
        self.collisions.get(handle)
    }

    /// A registered static collision, mutably
    pub fn collision_mut(&mut self, handle: CollisionHandle) -> Option<&mut CollisionComponent> {
        self.collisions.get_mut(handle)
    }

    /// A registered rigidbody
    pub fn rigidbody(&self, handle: RigidbodyHandle) -> Option<&RigidbodyComponent> {
        self.rigidbodies.get(handle)
    }

    /// A registered rigidbody, mutably
    pub fn rigidbody_mut(&mut self, handle: RigidbodyHandle) -> Option<&mut RigidbodyComponent> {
        self.rigidbodies.get_mut(handle)
    }

    /// The collision component behind any collider reference
    pub fn collider(&self, collider: ColliderRef) -> Option<&CollisionComponent> {
        match collider {
            ColliderRef::Collision(handle) => self.collisions.get(handle),
            ColliderRef::Rigidbody(handle) => self.rigidbodies.get(handle).map(RigidbodyComponent::collision),
        }
    }

    fn collider_mut(&mut self, collider: ColliderRef) -> Option<&mut CollisionComponent> {
        match collider {
            ColliderRef::Collision(handle) => self.collisions.get_mut(handle),
            ColliderRef::Rigidbody(handle) => self.rigidbodies.get_mut(handle).map(RigidbodyComponent::collision_mut),
        }
    }

    /// Move a static collision; false when the handle is stale
    pub fn set_collision_transform(&mut self, handle: CollisionHandle, transform: Transform) -> bool {
        match self.collisions.get_mut(handle) {
            Some(collision) => {
                collision.set_transform(transform);
                true
            }
            None => false,
        }
    }

    /// Number of static collisions
    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    /// Number of rigidbodies
    pub fn rigidbody_count(&self) -> usize {
        self.rigidbodies.len()
    }

    /// Number of live debug raycasts
    pub fn debug_raycast_count(&self) -> usize {
        self.raycasts.len()
    }

    /// Live debug raycasts
    pub fn debug_raycasts(&self) -> impl Iterator<Item = &DebugRaycast> {
        self.raycasts.values()
    }

    /// Handles of every rigidbody
    pub fn rigidbody_handles(&self) -> impl Iterator<Item = RigidbodyHandle> + '_ {
        self.rigidbodies.keys()
    }

    // ---- frame ----

    /// Advance the world by `delta_time` seconds
    pub fn step(&mut self, delta_time: f32) {
        let gravity = self.config.gravity;
        for body in self.rigidbodies.values_mut() {
            body.begin_frame(delta_time, gravity);
        }

        for collision in self.collisions.values_mut() {
            collision.clear_intersected();
        }
        for body in self.rigidbodies.values_mut() {
            body.collision_mut().clear_intersected();
        }

        self.raycasts.retain(|_, raycast| !raycast.tick(delta_time));
        self.update_debug_raycasts();

        self.resolve_static_collisions();
        self.resolve_dynamic_collisions();

        for body in self.rigidbodies.values_mut() {
            body.integrate();
            body.commit_last_frame_position();
        }

        self.flush_removals();
    }

    fn update_debug_raycasts(&mut self) {
        let results: Vec<(RaycastHandle, RaycastHitInfos)> = self
            .raycasts
            .iter()
            .map(|(handle, raycast)| (handle, self.closest_hit(&raycast.ray, raycast.test_channels)))
            .collect();

        for (handle, hit) in results {
            if let Some(raycast) = self.raycasts.get_mut(handle) {
                raycast.last_hit = hit;
            }
            if let Some(collider) = hit.collider.and_then(|collider| self.collider_mut(collider)) {
                collider.force_intersected();
            }
        }
    }

    fn resolve_static_collisions(&mut self) {
        let settings = ResponseSettings::from(&self.config);
        let bodies: Vec<RigidbodyHandle> = self.rigidbodies.keys().collect();
        let statics: Vec<CollisionHandle> = self.collisions.keys().collect();

        for &body in &bodies {
            for &shape in &statics {
                if let Some(contact) = self.test_static(body, shape, &settings) {
                    self.apply_static_contact(body, shape, contact);
                }
            }
        }
    }

    fn test_static(&self, handle: RigidbodyHandle, shape: CollisionHandle, settings: &ResponseSettings) -> Option<Contact> {
        let body = self.rigidbodies.get(handle)?;
        let collision = self.collisions.get(shape)?;
        if !body.test_channels().contains(collision.channel()) {
            return None;
        }

        if !body.is_physics_active() {
            let hit = if body.use_ccd() {
                body.collision().resolve_collision_ccd(collision, true)
            } else {
                body.collision().resolve_collision(collision)
            };
            return hit.then_some(Contact::Detected);
        }

        let test_channels = body.test_channels();
        let response = collide_body_box(
            &body.moving_box(),
            &collision.world_box(),
            body.use_ccd(),
            settings,
            |candidate| self.is_free(candidate, test_channels, handle),
        )?;
        Some(Contact::Resolved(response))
    }

    fn apply_static_contact(&mut self, handle: RigidbodyHandle, shape: CollisionHandle, contact: Contact) {
        let other = ColliderRef::Collision(shape);
        let this = ColliderRef::Rigidbody(handle);

        if let Some(body) = self.rigidbodies.get_mut(handle) {
            if let Contact::Resolved(response) = contact {
                body.apply_response(&response);
                let event = RepulsionEvent { body: handle, other, response };
                body.on_collision_repulsed.broadcast(&event, &mut self.removals);
            }
            body.collision_mut().force_intersected();
            body.on_collision_intersect.broadcast(&CollisionEvent { this, other }, &mut self.removals);
        }
        if let Some(collision) = self.collisions.get_mut(shape) {
            collision.force_intersected();
            collision.on_collision_intersect.broadcast(&CollisionEvent { this: other, other: this }, &mut self.removals);
        }
        log::trace!("Rigidbody {:?} hit collision {:?}", handle, shape);
    }

    fn resolve_dynamic_collisions(&mut self) {
        let bodies: Vec<RigidbodyHandle> = self.rigidbodies.keys().collect();

        for i in 0..bodies.len() {
            for j in i + 1..bodies.len() {
                if let Some(contact) = self.test_pair(bodies[i], bodies[j]) {
                    self.apply_pair_contact(bodies[i], bodies[j], contact);
                }
            }
        }
    }

    fn test_pair(&self, a: RigidbodyHandle, b: RigidbodyHandle) -> Option<PairContact> {
        let body_a = self.rigidbodies.get(a)?;
        let body_b = self.rigidbodies.get(b)?;
        if !should_collide(
            body_a.collision().channel(),
            body_a.test_channels(),
            body_b.collision().channel(),
            body_b.test_channels(),
        ) {
            return None;
        }

        if body_a.use_ccd() || body_b.use_ccd() {
            let (start_a, displacement_a) = sweep_of(body_a);
            let (start_b, displacement_b) = sweep_of(body_b);
            return collide_ccd_bodies(&start_a, displacement_a, &start_b, displacement_b)
                .then_some(PairContact::Detected);
        }

        let moving_a = body_a.moving_box();
        let moving_b = body_b.moving_box();
        if body_a.is_physics_active() && body_b.is_physics_active() {
            return collide_bodies(&moving_a, &moving_b)
                .map(|(response_a, response_b)| PairContact::Resolved(response_a, response_b));
        }
        boxes_overlap(&moving_a.destination(), &moving_b.destination()).then_some(PairContact::Detected)
    }

    fn apply_pair_contact(&mut self, a: RigidbodyHandle, b: RigidbodyHandle, contact: PairContact) {
        let responses = match contact {
            PairContact::Resolved(response_a, response_b) => Some((response_a, response_b)),
            PairContact::Detected => None,
        };

        for (this, other, response) in [
            (a, b, responses.map(|(response, _)| response)),
            (b, a, responses.map(|(_, response)| response)),
        ] {
            let Some(body) = self.rigidbodies.get_mut(this) else {
                continue;
            };
            if let Some(response) = response {
                body.apply_response(&response);
                let event = RepulsionEvent { body: this, other: other.into(), response };
                body.on_collision_repulsed.broadcast(&event, &mut self.removals);
            }
            body.collision_mut().force_intersected();
            let event = CollisionEvent { this: this.into(), other: other.into() };
            body.on_collision_intersect.broadcast(&event, &mut self.removals);
        }
        log::trace!("Rigidbodies {:?} and {:?} collided", a, b);
    }

    /// Whether `candidate` overlaps nothing `test_channels` accepts,
    /// ignoring the body `ignore`
    fn is_free(&self, candidate: &Aabb, test_channels: TestChannels, ignore: RigidbodyHandle) -> bool {
        let blocked_by_static = self
            .collisions
            .values()
            .filter(|collision| test_channels.contains(collision.channel()))
            .any(|collision| boxes_overlap(candidate, &collision.world_box()));
        if blocked_by_static {
            return false;
        }

        !self
            .rigidbodies
            .iter()
            .filter(|(handle, body)| *handle != ignore && test_channels.contains(body.collision().channel()))
            .any(|(_, body)| boxes_overlap(candidate, &body.collision().world_box()))
    }

    /// Every collider `test_channels` accepts, statics first
    fn colliders(&self, test_channels: TestChannels) -> impl Iterator<Item = (ColliderRef, &CollisionComponent)> {
        let statics = self
            .collisions
            .iter()
            .map(|(handle, collision)| (ColliderRef::Collision(handle), collision));
        let bodies = self
            .rigidbodies
            .iter()
            .map(|(handle, body)| (ColliderRef::Rigidbody(handle), body.collision()));
        statics
            .chain(bodies)
            .filter(move |(_, collision)| test_channels.contains(collision.channel()))
    }

    fn closest_hit(&self, ray: &Ray, test_channels: TestChannels) -> RaycastHitInfos {
        let mut best = RaycastHitInfos::new();
        for (collider, collision) in self.colliders(test_channels) {
            collision.resolve_raycast(ray, collider, &mut best);
        }
        best
    }

    // ---- queries ----

    /// Closest hit along the segment from `start` to `end`
    ///
    /// A positive `debug_duration` keeps the raycast alive for that many
    /// seconds: it is drawn and retested every step, and whatever it hits is
    /// flagged intersected. The hit collider's `on_raycast_intersect` fires
    /// either way.
    pub fn raycast_line(&mut self, start: Vec3, end: Vec3, test_channels: &TestChannels, debug_duration: f32) -> RaycastHitInfos {
        let ray = Ray::from_start_end(start, end);
        let hit = self.closest_hit(&ray, *test_channels);

        if debug_duration > 0.0 {
            let mut raycast = DebugRaycast::new(ray, *test_channels, debug_duration);
            raycast.last_hit = hit;
            self.raycasts.insert(raycast);

            if let Some(collision) = hit.collider.and_then(|collider| self.collider_mut(collider)) {
                collision.force_intersected();
            }
        }

        if let Some(collider) = hit.collider {
            let event = RaycastEvent {
                collider,
                location: hit.location,
                distance: hit.distance,
            };
            let removals = &mut self.removals;
            let target = match collider {
                ColliderRef::Collision(handle) => self.collisions.get_mut(handle),
                ColliderRef::Rigidbody(handle) => self.rigidbodies.get_mut(handle).map(RigidbodyComponent::collision_mut),
            };
            if let Some(collision) = target {
                collision.on_raycast_intersect.broadcast(&event, removals);
            }
        }

        hit
    }

    /// Closest collider hit by a box of `half_extents` swept from `start` to `end`
    pub fn sweep_box(&self, start: Vec3, end: Vec3, half_extents: Vec3, test_channels: &TestChannels) -> Option<(ColliderRef, SweepHit)> {
        let mover = Aabb::new(start, half_extents);
        let mut best: Option<(ColliderRef, SweepHit)> = None;

        for (collider, collision) in self.colliders(*test_channels) {
            let Some(hit) = sweep_box(&mover, end, &collision.world_box()) else {
                continue;
            };
            if best.map_or(true, |(_, closest)| hit.distance < closest.distance) {
                best = Some((collider, hit));
            }
        }
        best
    }

    /// Whether `aabb` overlaps any collider `test_channels` accepts
    pub fn overlap_box(&self, aabb: &Aabb, test_channels: &TestChannels) -> bool {
        self.colliders(*test_channels)
            .any(|(_, collision)| boxes_overlap(aabb, &collision.world_box()))
    }

    // ---- debug ----

    /// Draw every shape and debug raycast, when debug drawing is enabled
    pub fn draw_debug(&self, drawer: &mut dyn DebugDraw) {
        if !self.config.debug_draw {
            return;
        }

        let colors = &self.config.debug_colors;
        for collision in self.collisions.values() {
            collision.draw_debug(drawer, colors);
        }
        for body in self.rigidbodies.values() {
            body.collision().draw_debug(drawer, colors);
        }
        for raycast in self.raycasts.values() {
            if raycast.last_hit.is_hit() {
                drawer.draw_line(raycast.ray.origin, raycast.last_hit.location, colors.raycast_hit);
                let marker = Vec3::new(HIT_MARKER_EXTENTS, HIT_MARKER_EXTENTS, HIT_MARKER_EXTENTS);
                drawer.draw_box(raycast.last_hit.location, marker, colors.raycast_hit);
            } else {
                drawer.draw_line(raycast.ray.origin, raycast.ray.end(), colors.raycast_miss);
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

/// Box at the start of the body's movement this frame, and that movement
///
/// Physics-driven bodies are about to move by their anticipated movement;
/// the others were moved by game code since the last frame.
fn sweep_of(body: &RigidbodyComponent) -> (Aabb, Vec3) {
    if body.is_physics_active() {
        (body.collision().world_box(), body.anticipated_movement())
    } else {
        (body.collision().last_frame_box(), body.collision().frame_displacement())
    }
}
