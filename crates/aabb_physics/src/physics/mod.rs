//! Physics module for collision detection and response
//!
//! Provides box collision detection, continuous collision detection for
//! fast movers, collision response with step climbing, and ray queries,
//! all driven by [`PhysicsWorld`].

pub mod collision;
pub mod collision_channels;
pub mod raycast;
pub mod response;
pub mod rigidbody;
pub mod world;

#[cfg(test)]
mod tests;

pub use collision::{
    Aabb,
    CollisionComponent,
    CollisionShape,
    Ray,
    RayMode,
    SweepHit,
};
pub use collision_channels::{ChannelError, ChannelId, CollisionChannels, TestChannels};
pub use raycast::{DebugRaycast, RaycastHitInfos};
pub use response::CollisionResponse;
pub use rigidbody::{BodyFlags, RigidbodyComponent};
pub use world::PhysicsWorld;
