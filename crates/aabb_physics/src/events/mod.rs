//! Event callbacks for collision components
//!
//! Every collision component and rigidbody owns a few [`Signal`]s. The
//! physics world broadcasts them synchronously, the moment a hit is
//! detected, so a subscriber may see a collision before the rest of the
//! frame has been resolved.
//!
//! Subscribers run in registration order. They never get access to the
//! world itself, so they cannot destroy the component that is broadcasting.
//! Instead they receive a [`RemovalQueue`] and may request removals, which
//! the world applies once the frame's scan is finished.

use std::fmt;

use crate::foundation::collections::{ColliderRef, CollisionHandle, RigidbodyHandle};
use crate::foundation::math::Vec3;
use crate::physics::response::CollisionResponse;

/// A collision was detected between `this` and `other`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The collider the event is broadcast on
    pub this: ColliderRef,
    /// The collider it hit
    pub other: ColliderRef,
}

/// A raycast closest hit landed on `collider`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastEvent {
    /// The collider that was hit
    pub collider: ColliderRef,
    /// Where the ray hit
    pub location: Vec3,
    /// Distance along the ray
    pub distance: f32,
}

/// A rigidbody was pushed out of another collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepulsionEvent {
    /// The body that was repulsed
    pub body: RigidbodyHandle,
    /// What it was pushed out of
    pub other: ColliderRef,
    /// The applied response
    pub response: CollisionResponse,
}

/// Removals requested from inside event callbacks
///
/// Applied by the world at the end of the frame, after every test ran.
#[derive(Debug, Default)]
pub struct RemovalQueue {
    collisions: Vec<CollisionHandle>,
    rigidbodies: Vec<RigidbodyHandle>,
}

impl RemovalQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Request removal of a static collision
    pub fn remove_collision(&mut self, handle: CollisionHandle) {
        if !self.collisions.contains(&handle) {
            self.collisions.push(handle);
        }
    }

    /// Request removal of a rigidbody
    pub fn remove_rigidbody(&mut self, handle: RigidbodyHandle) {
        if !self.rigidbodies.contains(&handle) {
            self.rigidbodies.push(handle);
        }
    }

    /// Request removal of whatever `collider` refers to
    pub fn remove(&mut self, collider: ColliderRef) {
        match collider {
            ColliderRef::Collision(handle) => self.remove_collision(handle),
            ColliderRef::Rigidbody(handle) => self.remove_rigidbody(handle),
        }
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty() && self.rigidbodies.is_empty()
    }

    /// Number of queued removals
    pub fn len(&self) -> usize {
        self.collisions.len() + self.rigidbodies.len()
    }

    /// Take every queued removal, leaving the queue empty
    pub fn drain(&mut self) -> (Vec<CollisionHandle>, Vec<RigidbodyHandle>) {
        (
            std::mem::take(&mut self.collisions),
            std::mem::take(&mut self.rigidbodies),
        )
    }
}

/// Identifies one subscription of a [`Signal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<A> = Box<dyn FnMut(&A, &mut RemovalQueue)>;

/// Ordered list of callbacks invoked synchronously on broadcast
pub struct Signal<A> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<A>)>,
}

impl<A> Signal<A> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            next_id: 0,
            callbacks: Vec::new(),
        }
    }

    /// Register a callback, returning an id usable with [`unsubscribe`]
    ///
    /// [`unsubscribe`]: Signal::unsubscribe
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&A, &mut RemovalQueue) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback; false if it was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// Invoke every callback in registration order
    pub fn broadcast(&mut self, args: &A, removals: &mut RemovalQueue) {
        for (_, callback) in &mut self.callbacks {
            callback(args, removals);
        }
    }

    /// Number of subscribers
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// True when nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Drop every subscriber
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_broadcast_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut signal: Signal<u32> = Signal::new();

        let first = Rc::clone(&order);
        signal.subscribe(move |value, _| first.borrow_mut().push(("first", *value)));
        let second = Rc::clone(&order);
        signal.subscribe(move |value, _| second.borrow_mut().push(("second", *value)));

        let mut removals = RemovalQueue::new();
        signal.broadcast(&7, &mut removals);

        assert_eq!(*order.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut signal: Signal<()> = Signal::new();

        let counter = Rc::clone(&hits);
        let id = signal.subscribe(move |_, _| *counter.borrow_mut() += 1);

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));

        signal.broadcast(&(), &mut RemovalQueue::new());
        assert_eq!(*hits.borrow(), 0);
        assert!(signal.is_empty());
    }

    #[test]
    fn test_callbacks_can_queue_removals() {
        let mut signal: Signal<()> = Signal::new();
        signal.subscribe(|_, removals| removals.remove_collision(CollisionHandle::default()));
        signal.subscribe(|_, removals| removals.remove_collision(CollisionHandle::default()));

        let mut removals = RemovalQueue::new();
        signal.broadcast(&(), &mut removals);

        // duplicate requests collapse
        assert_eq!(removals.len(), 1);
        let (collisions, rigidbodies) = removals.drain();
        assert_eq!(collisions.len(), 1);
        assert!(rigidbodies.is_empty());
        assert!(removals.is_empty());
    }
}
