// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event identification types.
//!
//! This module provides [`EventId`] for runtime event identification,
//! [`PrivateKey`] for non-routed handler-store slots, and [`RoutedEvent<P>`]
//! for type-safe compile-time event keys.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// How a routed event propagates through the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RoutingStrategy {
    /// Root-to-leaf: ancestors see the event before the target.
    Tunnel,
    /// Leaf-to-root: the target sees the event before its ancestors.
    Bubble,
    /// Single-target only: no tree walk.
    Direct,
}

/// A runtime routed-event identifier.
///
/// This is the event's process-global slot index, assigned once at
/// registration and never reused. Per-node handler stores key their slots by
/// it, so dispatch never hashes names or types.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u32);

impl EventId {
    /// Creates a new event ID from the given index.
    ///
    /// This is typically called by
    /// [`EventRegistry::register`](crate::EventRegistry::register) rather
    /// than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this event ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventId").field(&self.0).finish()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.0)
    }
}

/// A key for private (non-routed) handler-store slots.
///
/// Private keys share the event index space: a key allocated by
/// [`EventRegistry::allocate_private_key`](crate::EventRegistry::allocate_private_key)
/// never collides with a routed event's slot.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrivateKey(u32);

impl PrivateKey {
    /// Creates a new private key from the given index.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this key.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&self.0).finish()
    }
}

/// A type-safe routed-event key with a phantom payload type.
///
/// This wraps an [`EventId`] with a phantom type parameter `P`, the payload
/// type carried by [`EventArgs`](crate::EventArgs) for this event. Typed
/// registration and args construction are checked at compile time; erased
/// paths re-check the payload [`TypeId`](core::any::TypeId) at runtime.
///
/// # Memory Layout
///
/// `RoutedEvent<P>` is the same size as `EventId` (4 bytes) since
/// `PhantomData` has zero size.
pub struct RoutedEvent<P> {
    id: EventId,
    _marker: PhantomData<fn() -> P>,
}

impl<P> RoutedEvent<P> {
    /// Creates a new typed event key from an event ID.
    ///
    /// This is typically called by
    /// [`EventRegistry::register`](crate::EventRegistry::register) rather
    /// than directly. The caller must ensure that the `EventId` was
    /// registered with the same payload type `P`; mismatched types panic at
    /// the next runtime check.
    #[must_use]
    #[inline]
    pub const fn from_id(id: EventId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying event ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> EventId {
        self.id
    }
}

// Manual trait implementations to avoid requiring P: Clone, etc.

impl<P> Copy for RoutedEvent<P> {}

impl<P> Clone for RoutedEvent<P> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> PartialEq for RoutedEvent<P> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for RoutedEvent<P> {}

impl<P> Hash for RoutedEvent<P> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<P> fmt::Debug for RoutedEvent<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedEvent")
            .field("id", &self.id)
            .field("payload", &core::any::type_name::<P>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_basics() {
        let id = EventId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id, EventId::new(42));
        assert_ne!(id, EventId::new(43));
    }

    #[test]
    fn event_id_debug() {
        assert_eq!(format!("{:?}", EventId::new(42)), "EventId(42)");
    }

    #[test]
    fn private_key_basics() {
        let key = PrivateKey::new(7);
        assert_eq!(key.index(), 7);
        assert_eq!(format!("{key:?}"), "PrivateKey(7)");
    }

    #[test]
    fn routed_event_identity_ignores_payload_type() {
        let id = EventId::new(1);
        let a: RoutedEvent<String> = RoutedEvent::from_id(id);
        let b: RoutedEvent<u32> = RoutedEvent::from_id(id);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn routed_event_copy_clone() {
        let event: RoutedEvent<u32> = RoutedEvent::from_id(EventId::new(1));
        let copy = event;
        assert_eq!(event, copy);
    }

    #[test]
    fn routed_event_size() {
        use core::mem::size_of;
        assert_eq!(size_of::<EventId>(), 4);
        assert_eq!(size_of::<RoutedEvent<String>>(), 4);
    }
}
