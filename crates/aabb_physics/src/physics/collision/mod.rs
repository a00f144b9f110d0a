//! Box collision: primitives, algorithms and the placed component
//!
//! # Architecture
//!
//! - **Model Space Storage**: shapes are stored in local coordinates
//! - **On-Demand Transformation**: shapes are transformed to world space only during tests
//!
//! # Module Organization
//!
//! - [`primitives`] - Boxes and rays
//! - [`intersect`] - Overlap, slab raycast and swept tests
//! - [`shape`] - Model-space shapes and [`CollisionComponent`]

pub mod primitives;
pub mod intersect;
pub mod shape;

pub use primitives::{Aabb, Ray};
pub use intersect::{RayBoxHit, RayMode, SweepHit};
pub use shape::{CollisionComponent, CollisionShape, WorldSpaceShape};
