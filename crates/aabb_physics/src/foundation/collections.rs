//! Handle types for the physics registries

use slotmap::new_key_type;

pub use slotmap::SlotMap;

new_key_type! {
    /// Handle to a static collision registered in a physics world
    pub struct CollisionHandle;

    /// Handle to a rigidbody registered in a physics world
    pub struct RigidbodyHandle;

    /// Handle to a persistent debug raycast
    pub struct RaycastHandle;
}

/// Generation-checked map from handles to values held by the world
pub type HandleMap<K, T> = SlotMap<K, T>;

/// Reference to anything a query or a collision can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderRef {
    /// A static collision
    Collision(CollisionHandle),
    /// The collision owned by a rigidbody
    Rigidbody(RigidbodyHandle),
}

impl From<CollisionHandle> for ColliderRef {
    fn from(handle: CollisionHandle) -> Self {
        Self::Collision(handle)
    }
}

impl From<RigidbodyHandle> for ColliderRef {
    fn from(handle: RigidbodyHandle) -> Self {
        Self::Rigidbody(handle)
    }
}
