//! # AABB Physics
//!
//! Real-time collision detection and resolution for axis-aligned boxes.
//!
//! ## Features
//!
//! - **Box Collision**: Minkowski-difference overlap tests between static and moving boxes
//! - **Collision Response**: Movement-aware push-out, weighted between moving bodies
//! - **Continuous Collision Detection**: Swept tests so fast movers cannot tunnel
//! - **Step Climbing**: Bodies walk onto ledges lower than their step height
//! - **Ray Queries**: Closest-hit raycasts and persistent debug raycasts
//! - **Collision Channels**: Named filtering so bullets can ignore bullets
//!
//! ## Quick Start
//!
//! ```rust
//! use aabb_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default());
//!
//! // A floor whose top face sits at y = 0
//! world.create_collision(CollisionComponent::new(
//!     CollisionShape::cuboid(Vec3::new(10.0, 0.5, 10.0)),
//!     Transform::from_position(Vec3::new(0.0, -0.5, 0.0)),
//!     ChannelId::DEFAULT,
//! ));
//!
//! // A crate dropped from above
//! let body = world.create_rigidbody(RigidbodyComponent::new(CollisionComponent::new(
//!     CollisionShape::cuboid(Vec3::new(0.5, 0.5, 0.5)),
//!     Transform::from_position(Vec3::new(0.0, 3.0, 0.0)),
//!     ChannelId::DEFAULT,
//! )));
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//!
//! let crate_body = world.rigidbody(body).unwrap();
//! assert!(crate_body.is_on_ground());
//! assert!(crate_body.position().y >= 0.5);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod debug;
pub mod events;
pub mod physics;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        debug::{CollisionDebugColors, DebugDraw, DebugDrawSystem},
        events::{CollisionEvent, RaycastEvent, RemovalQueue, RepulsionEvent, Signal},
        foundation::{
            collections::{ColliderRef, CollisionHandle, RigidbodyHandle},
            math::{Transform, Vec3, Vec4},
        },
        physics::{
            Aabb, BodyFlags, ChannelError, ChannelId, CollisionComponent, CollisionResponse, CollisionShape,
            PhysicsWorld, Ray, RaycastHitInfos, RigidbodyComponent, TestChannels,
        },
    };
}
