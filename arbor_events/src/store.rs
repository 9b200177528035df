// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node sparse handler storage.
//!
//! This module provides [`HandlerStore`] for storing event handlers on tree
//! nodes, using sparse storage to minimize memory for nodes with few
//! handlers.
//!
//! # Implementation
//!
//! A sorted vector with binary search rather than a hash map: handler slots
//! are keyed by the event's global index, typical nodes hold a handful of
//! registrations, and contiguous memory wins at dispatch time. The first few
//! slots are stored inline via `SmallVec`.
//!
//! A slot whose last handler is removed is evicted from the vector, not left
//! holding an empty list — nodes with churn-heavy registration stay bounded.

use core::fmt;
use std::rc::Rc;

use smallvec::{SmallVec, smallvec};

use crate::event::{EventId, PrivateKey};
use crate::handler::{Callback, InstanceHandler};

/// Default inline capacity for handler slots.
///
/// Most nodes register handlers for only a few events, so this avoids heap
/// allocation in the common case.
const INLINE_SLOTS: usize = 4;

/// One instance-handler registration in a node's store.
pub struct RoutedEntry<K> {
    /// The handler to invoke.
    pub handler: InstanceHandler<K>,
    /// Whether the handler observes already-handled events.
    pub handled_events_too: bool,
}

impl<K> Clone for RoutedEntry<K> {
    fn clone(&self) -> Self {
        Self {
            handler: Rc::clone(&self.handler),
            handled_events_too: self.handled_events_too,
        }
    }
}

impl<K> fmt::Debug for RoutedEntry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutedEntry")
            .field("handled_events_too", &self.handled_events_too)
            .finish_non_exhaustive()
    }
}

enum Slot<K> {
    Routed(SmallVec<[RoutedEntry<K>; 1]>),
    Private(SmallVec<[Callback<K>; 1]>),
}

/// Per-node sparse storage for event handlers.
///
/// Two slot flavors share one key space: routed events hold ordered lists of
/// ([`InstanceHandler`], `handled_events_too`) pairs, private keys hold
/// ordered callback lists. Keys never collide across flavors because the
/// registry allocates both from one counter.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use arbor_events::{EventId, HandlerStore, InstanceHandler};
///
/// let event = EventId::new(0);
/// let mut store: HandlerStore<u32> = HandlerStore::new();
///
/// let handler: InstanceHandler<u32> = Rc::new(|_, _| {});
/// store.add_handler(event, Rc::clone(&handler), false);
/// assert!(store.contains(event));
///
/// store.remove_handler(event, &handler);
/// assert!(!store.contains(event));
/// assert!(store.is_empty());
/// ```
pub struct HandlerStore<K> {
    slots: SmallVec<[(u32, Slot<K>); INLINE_SLOTS]>,
}

impl<K: Copy + Eq> Default for HandlerStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq> HandlerStore<K> {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: SmallVec::new(),
        }
    }

    /// Binary search for a slot by key index.
    #[inline]
    fn find(&self, key: u32) -> Result<usize, usize> {
        self.slots.binary_search_by_key(&key, |(k, _)| *k)
    }

    // =========================================================================
    // Routed handlers
    // =========================================================================

    /// Adds a routed-event handler, composing with any already registered
    /// under the same event.
    ///
    /// # Panics
    ///
    /// Panics if the slot holds private callbacks (a forged key).
    pub fn add_handler(
        &mut self,
        event: EventId,
        handler: InstanceHandler<K>,
        handled_events_too: bool,
    ) {
        let entry = RoutedEntry {
            handler,
            handled_events_too,
        };
        match self.find(event.index()) {
            Ok(i) => match &mut self.slots[i].1 {
                Slot::Routed(list) => list.push(entry),
                Slot::Private(_) => panic!(
                    "slot {} holds private callbacks, not routed handlers",
                    event.index()
                ),
            },
            Err(i) => self
                .slots
                .insert(i, (event.index(), Slot::Routed(smallvec![entry]))),
        }
    }

    /// Removes exactly one previously added handler, matching by pointer
    /// identity. Removing a handler that is not present is a no-op.
    ///
    /// The slot is reclaimed when its last handler is removed.
    pub fn remove_handler(&mut self, event: EventId, handler: &InstanceHandler<K>) {
        if let Ok(i) = self.find(event.index())
            && let Slot::Routed(list) = &mut self.slots[i].1
        {
            if let Some(pos) = list.iter().position(|e| Rc::ptr_eq(&e.handler, handler)) {
                list.remove(pos);
                if list.is_empty() {
                    self.slots.remove(i);
                }
            }
        }
    }

    /// Returns the ordered handlers registered for `event`, if any.
    #[must_use]
    pub fn handlers_for(&self, event: EventId) -> Option<&[RoutedEntry<K>]> {
        match self.find(event.index()) {
            Ok(i) => match &self.slots[i].1 {
                Slot::Routed(list) => Some(list),
                Slot::Private(_) => None,
            },
            Err(_) => None,
        }
    }

    /// Returns `true` if any handler is registered for `event`.
    #[must_use]
    pub fn contains(&self, event: EventId) -> bool {
        self.handlers_for(event).is_some()
    }

    // =========================================================================
    // Private callbacks
    // =========================================================================

    /// Adds a private callback, composing with any already registered under
    /// the same key.
    ///
    /// # Panics
    ///
    /// Panics if the slot holds routed handlers (a forged key).
    pub fn add(&mut self, key: PrivateKey, callback: Callback<K>) {
        match self.find(key.index()) {
            Ok(i) => match &mut self.slots[i].1 {
                Slot::Private(list) => list.push(callback),
                Slot::Routed(_) => panic!(
                    "slot {} holds routed handlers, not private callbacks",
                    key.index()
                ),
            },
            Err(i) => self
                .slots
                .insert(i, (key.index(), Slot::Private(smallvec![callback]))),
        }
    }

    /// Removes exactly one previously added callback, matching by pointer
    /// identity. The slot is reclaimed when its last callback is removed.
    pub fn remove(&mut self, key: PrivateKey, callback: &Callback<K>) {
        if let Ok(i) = self.find(key.index())
            && let Slot::Private(list) = &mut self.slots[i].1
        {
            if let Some(pos) = list.iter().position(|c| Rc::ptr_eq(c, callback)) {
                list.remove(pos);
                if list.is_empty() {
                    self.slots.remove(i);
                }
            }
        }
    }

    /// Returns the ordered callbacks registered under `key`, if any.
    #[must_use]
    pub fn callbacks_for(&self, key: PrivateKey) -> Option<&[Callback<K>]> {
        match self.find(key.index()) {
            Ok(i) => match &self.slots[i].1 {
                Slot::Private(list) => Some(list),
                Slot::Routed(_) => None,
            },
            Err(_) => None,
        }
    }

    /// Returns `true` if any callback is registered under `key`.
    #[must_use]
    pub fn contains_key(&self, key: PrivateKey) -> bool {
        self.callbacks_for(key).is_some()
    }

    /// Invokes every callback registered under `key` for `node`.
    pub fn invoke_callbacks(&self, key: PrivateKey, node: K) {
        if let Some(callbacks) = self.callbacks_for(key) {
            for callback in callbacks {
                callback(node);
            }
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Returns the number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no handlers or callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K> fmt::Debug for HandlerStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerStore")
            .field("slots", &self.slots.len())
            .finish()
    }
}
