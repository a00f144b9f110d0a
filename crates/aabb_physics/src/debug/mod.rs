//! Debug module for visualization and debugging tools

pub mod draw;
pub mod collision_debug;

pub use draw::{DebugDraw, DebugDrawSystem, DebugShape};
pub use collision_debug::CollisionDebugColors;
