// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Global routed-event registry.
//!
//! This module provides [`EventRegistry`] for registering events and class
//! handlers, and [`GlobalRegistry`] for exposing one registry process-wide
//! with explicit init-once semantics.
//!
//! The registry is the one piece of shared mutable global state in the
//! event system: registration can legitimately race from multiple threads
//! during startup, so all mutation and the index counter are serialized.
//! Warm class-handler lookups take only the shared read path.

use core::any::TypeId;
use core::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;

use crate::args::{ErasedPayload, EventArgs};
use crate::class_handlers::{ClassHandlerEntry, ClassHandlerStore};
use crate::event::{EventId, PrivateKey, RoutedEvent, RoutingStrategy};
use crate::target::{TargetKind, TargetType, TypeTable};

/// Immutable identity of a registered event.
#[derive(Copy, Clone, Debug)]
pub struct EventInfo {
    /// Name, unique within the owner type.
    pub name: &'static str,
    /// How the event propagates.
    pub strategy: RoutingStrategy,
    /// The type the event was registered on.
    pub owner: TargetType,
    /// The declared payload type.
    pub payload_type: TypeId,
}

struct Inner<K> {
    types: TypeTable,
    descriptors: HashMap<EventId, EventInfo>,
    per_owner: HashMap<TargetType, HashMap<&'static str, EventId>>,
    class: ClassHandlerStore<K>,
}

/// A registry for routed events and class handlers.
///
/// Events are registered once at startup; each receives a unique,
/// never-reused, monotonically increasing index used as the slot key in
/// per-node [`HandlerStore`](crate::HandlerStore)s.
///
/// # Example
///
/// ```rust
/// use arbor_events::{EventRegistry, RoutingStrategy, TargetKind};
///
/// let registry: EventRegistry<u32> = EventRegistry::new();
/// let element = registry.declare_type("Element", None, Some(TargetKind::Visual));
///
/// let click = registry.register::<()>("Click", RoutingStrategy::Bubble, element);
/// assert_eq!(registry.name(click.id()), Some("Click"));
/// assert_eq!(registry.lookup("Click", element, false), Some(click.id()));
/// ```
pub struct EventRegistry<K: Copy + Eq + 'static> {
    next_index: AtomicU32,
    inner: RwLock<Inner<K>>,
}

impl<K: Copy + Eq + 'static> Default for EventRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + 'static> EventRegistry<K> {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_index: AtomicU32::new(0),
            inner: RwLock::new(Inner {
                types: TypeTable::new(),
                descriptors: HashMap::new(),
                per_owner: HashMap::new(),
                class: ClassHandlerStore::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K>> {
        self.inner.read().expect("event registry lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K>> {
        self.inner.write().expect("event registry lock poisoned")
    }

    /// Allocates the next global index.
    ///
    /// # Panics
    ///
    /// Panics when the index space is exhausted; indices are never reused.
    fn alloc_index(&self) -> u32 {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        assert!(index < u32::MAX, "event index space exhausted");
        index
    }

    // =========================================================================
    // Target types
    // =========================================================================

    /// Declares a target type. See [`TypeTable::declare`].
    pub fn declare_type(
        &self,
        name: &'static str,
        base: Option<TargetType>,
        kind: Option<TargetKind>,
    ) -> TargetType {
        self.write().types.declare(name, base, kind)
    }

    /// Returns the kind of a declared type.
    #[must_use]
    pub fn target_kind(&self, ty: TargetType) -> Option<TargetKind> {
        self.read().types.kind(ty)
    }

    /// Returns the diagnostic name of a declared type.
    #[must_use]
    pub fn type_name(&self, ty: TargetType) -> Option<&'static str> {
        self.read().types.name(ty)
    }

    /// Returns `true` if `sub` is `sup` or derives from it.
    #[must_use]
    pub fn is_same_or_subtype(&self, sub: TargetType, sup: TargetType) -> bool {
        self.read().types.is_same_or_subtype(sub, sup)
    }

    // =========================================================================
    // Event registration and lookup
    // =========================================================================

    /// Registers a routed event on `owner`.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty, if `owner` is not declared, or if `name`
    /// is already registered for `owner` (the exact type — registering the
    /// same name on a different owner succeeds).
    pub fn register<P: 'static>(
        &self,
        name: &'static str,
        strategy: RoutingStrategy,
        owner: TargetType,
    ) -> RoutedEvent<P> {
        assert!(!name.is_empty(), "event name must not be empty");
        let mut inner = self.write();
        assert!(
            inner.types.contains(owner),
            "owner type {owner} is not declared"
        );
        let names = inner.per_owner.entry(owner).or_default();
        assert!(
            !names.contains_key(name),
            "routed event '{name}' is already registered for this owner type"
        );

        let id = EventId::new(self.alloc_index());
        names.insert(name, id);
        inner.descriptors.insert(
            id,
            EventInfo {
                name,
                strategy,
                owner,
                payload_type: TypeId::of::<P>(),
            },
        );
        RoutedEvent::from_id(id)
    }

    /// Allocates a private handler-store key from the same index space as
    /// events.
    pub fn allocate_private_key(&self) -> PrivateKey {
        PrivateKey::new(self.alloc_index())
    }

    /// Looks up an event by exact (ordinal) name on `owner`, optionally
    /// walking its base chain.
    #[must_use]
    pub fn lookup(&self, name: &str, owner: TargetType, include_ancestors: bool) -> Option<EventId> {
        let inner = self.read();
        if include_ancestors {
            for ty in inner.types.base_chain(owner) {
                if let Some(id) = inner.per_owner.get(&ty).and_then(|m| m.get(name)) {
                    return Some(*id);
                }
            }
            None
        } else {
            inner.per_owner.get(&owner).and_then(|m| m.get(name)).copied()
        }
    }

    /// Returns a snapshot of the events registered directly on `owner`, in
    /// registration order.
    #[must_use]
    pub fn events_for_owner(&self, owner: TargetType) -> Vec<EventId> {
        let inner = self.read();
        let mut ids: Vec<EventId> = inner
            .per_owner
            .get(&owner)
            .map(|m| m.values().copied().collect())
            .unwrap_or_default();
        ids.sort_by_key(|id| id.index());
        ids
    }

    /// Returns a snapshot of every registered event, in registration order.
    #[must_use]
    pub fn all_events(&self) -> Vec<EventId> {
        let inner = self.read();
        let mut ids: Vec<EventId> = inner.descriptors.keys().copied().collect();
        ids.sort_by_key(|id| id.index());
        ids
    }

    /// Returns the registered identity of an event.
    #[must_use]
    pub fn info(&self, id: EventId) -> Option<EventInfo> {
        self.read().descriptors.get(&id).copied()
    }

    /// Returns an event's name.
    #[must_use]
    pub fn name(&self, id: EventId) -> Option<&'static str> {
        self.info(id).map(|i| i.name)
    }

    /// Returns an event's routing strategy.
    #[must_use]
    pub fn strategy(&self, id: EventId) -> Option<RoutingStrategy> {
        self.info(id).map(|i| i.strategy)
    }

    /// Returns an event's owner type.
    #[must_use]
    pub fn owner(&self, id: EventId) -> Option<TargetType> {
        self.info(id).map(|i| i.owner)
    }

    /// Returns an event's declared payload type.
    #[must_use]
    pub fn payload_type(&self, id: EventId) -> Option<TypeId> {
        self.info(id).map(|i| i.payload_type)
    }

    /// Returns the number of registered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().descriptors.len()
    }

    /// Returns `true` if no events are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().descriptors.is_empty()
    }

    // =========================================================================
    // Class handlers
    // =========================================================================

    /// Registers a class handler: it fires for every instance of
    /// `class_type` and its subtypes, before instance handlers at the same
    /// node.
    ///
    /// # Panics
    ///
    /// Panics if the event is not registered, if the payload type `P` does
    /// not match the event's declared payload type, or if `class_type` was
    /// declared without a [`TargetKind`].
    pub fn register_class_handler<P: 'static>(
        &self,
        class_type: TargetType,
        event: RoutedEvent<P>,
        handler: impl Fn(K, &mut EventArgs<K>) + Send + Sync + 'static,
        handled_events_too: bool,
    ) {
        let mut inner = self.write();
        let info = *inner
            .descriptors
            .get(&event.id())
            .unwrap_or_else(|| panic!("event {} is not registered", event.id()));
        assert_eq!(
            info.payload_type,
            TypeId::of::<P>(),
            "class handler payload type does not match the event's declared payload type"
        );
        assert!(
            inner.types.kind(class_type).is_some(),
            "class handlers require a visual, content, or 3D target type"
        );

        let entry = ClassHandlerEntry {
            handler: Arc::new(handler),
            handled_events_too,
        };
        let Inner { types, class, .. } = &mut *inner;
        class.register(class_type, event.id(), entry, types);
    }

    /// Returns the merged class handlers for `(target_type, event)`,
    /// subclass handlers first.
    ///
    /// The first request for a given pair populates the cache; later
    /// registrations on base types push updates into it, so a warm entry is
    /// always current.
    #[must_use]
    pub fn class_handlers(
        &self,
        target_type: TargetType,
        event: EventId,
    ) -> Arc<[ClassHandlerEntry<K>]> {
        if let Some(list) = self.read().class.peek(target_type, event) {
            return list;
        }
        let mut inner = self.write();
        let Inner { types, class, .. } = &mut *inner;
        class.resolve(target_type, event, types)
    }

    // =========================================================================
    // Args construction
    // =========================================================================

    /// Builds [`EventArgs`] from an erased payload, checking it against the
    /// event's declared payload type.
    ///
    /// # Panics
    ///
    /// Panics if the event is not registered or the payload type mismatches.
    #[must_use]
    pub fn make_args(&self, event: EventId, payload: ErasedPayload) -> EventArgs<K> {
        let info = self
            .info(event)
            .unwrap_or_else(|| panic!("event {event} is not registered"));
        assert_eq!(
            info.payload_type,
            payload.type_id(),
            "payload type does not match the event's declared payload type"
        );
        EventArgs::from_parts(event, payload)
    }
}

impl<K: Copy + Eq + 'static> fmt::Debug for EventRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("EventRegistry")
            .field("events", &inner.descriptors.len())
            .field("types", &inner.types.len())
            .finish()
    }
}

/// A process-wide registry cell with explicit init-once semantics.
///
/// Startup code initializes the registry explicitly instead of relying on
/// implicit static-constructor ordering:
///
/// ```rust
/// use arbor_events::{EventRegistry, GlobalRegistry, RoutingStrategy, TargetKind};
///
/// static EVENTS: GlobalRegistry<u64> = GlobalRegistry::new();
///
/// let registry = EVENTS.init();
/// let element = registry.declare_type("Element", None, Some(TargetKind::Visual));
/// let click = registry.register::<()>("Click", RoutingStrategy::Bubble, element);
/// # let _ = click;
/// assert!(EVENTS.get().is_some());
/// ```
pub struct GlobalRegistry<K: Copy + Eq + 'static> {
    cell: OnceLock<EventRegistry<K>>,
}

impl<K: Copy + Eq + 'static> GlobalRegistry<K> {
    /// Creates an empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns the registry, creating it on first call.
    pub fn init(&self) -> &EventRegistry<K> {
        self.cell.get_or_init(EventRegistry::new)
    }

    /// Returns the registry if it was initialized.
    #[must_use]
    pub fn get(&self) -> Option<&EventRegistry<K>> {
        self.cell.get()
    }
}

impl<K: Copy + Eq + 'static> Default for GlobalRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + 'static> fmt::Debug for GlobalRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalRegistry")
            .field("initialized", &self.cell.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn registry_with_types() -> (EventRegistry<u32>, TargetType, TargetType) {
        let registry = EventRegistry::new();
        let element = registry.declare_type("Element", None, Some(TargetKind::Visual));
        let button = registry.declare_type("Button", Some(element), Some(TargetKind::Visual));
        (registry, element, button)
    }

    #[test]
    fn register_assigns_monotonic_indices() {
        let (registry, element, _) = registry_with_types();
        let a = registry.register::<()>("A", RoutingStrategy::Bubble, element);
        let b = registry.register::<()>("B", RoutingStrategy::Tunnel, element);
        assert!(a.id().index() < b.id().index());
    }

    #[test]
    fn private_keys_share_the_index_space() {
        let (registry, element, _) = registry_with_types();
        let a = registry.register::<()>("A", RoutingStrategy::Bubble, element);
        let key = registry.allocate_private_key();
        let b = registry.register::<()>("B", RoutingStrategy::Bubble, element);
        assert!(a.id().index() < key.index());
        assert!(key.index() < b.id().index());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_name_same_owner_panics() {
        let (registry, element, _) = registry_with_types();
        registry.register::<()>("X", RoutingStrategy::Bubble, element);
        registry.register::<()>("X", RoutingStrategy::Bubble, element);
    }

    #[test]
    fn duplicate_name_different_owner_succeeds() {
        let (registry, element, button) = registry_with_types();
        let a = registry.register::<()>("X", RoutingStrategy::Bubble, element);
        let b = registry.register::<()>("X", RoutingStrategy::Bubble, button);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn empty_event_name_panics() {
        let (registry, element, _) = registry_with_types();
        registry.register::<()>("", RoutingStrategy::Bubble, element);
    }

    #[test]
    fn lookup_exact_and_ancestors() {
        let (registry, element, button) = registry_with_types();
        let click = registry.register::<()>("Click", RoutingStrategy::Bubble, element);

        assert_eq!(registry.lookup("Click", element, false), Some(click.id()));
        assert_eq!(registry.lookup("Click", button, false), None);
        assert_eq!(registry.lookup("Click", button, true), Some(click.id()));
        // Ordinal comparison: no case folding.
        assert_eq!(registry.lookup("click", button, true), None);
    }

    #[test]
    fn snapshots_are_in_registration_order() {
        let (registry, element, button) = registry_with_types();
        let a = registry.register::<()>("A", RoutingStrategy::Bubble, element);
        let b = registry.register::<()>("B", RoutingStrategy::Bubble, button);
        let c = registry.register::<()>("C", RoutingStrategy::Bubble, element);

        assert_eq!(registry.events_for_owner(element), vec![a.id(), c.id()]);
        assert_eq!(registry.all_events(), vec![a.id(), b.id(), c.id()]);
    }

    #[test]
    fn info_round_trip() {
        let (registry, element, _) = registry_with_types();
        let click = registry.register::<String>("Click", RoutingStrategy::Tunnel, element);

        let info = registry.info(click.id()).unwrap();
        assert_eq!(info.name, "Click");
        assert_eq!(info.strategy, RoutingStrategy::Tunnel);
        assert_eq!(info.owner, element);
        assert_eq!(info.payload_type, TypeId::of::<String>());
    }

    #[test]
    #[should_panic(expected = "does not match the event's declared payload type")]
    fn class_handler_payload_mismatch_panics() {
        let (registry, element, _) = registry_with_types();
        let click = registry.register::<String>("Click", RoutingStrategy::Bubble, element);
        // Forge a wrongly-typed handle; the runtime check must catch it.
        let forged: RoutedEvent<u32> = RoutedEvent::from_id(click.id());
        registry.register_class_handler(element, forged, |_, _| {}, false);
    }

    #[test]
    #[should_panic(expected = "visual, content, or 3D target type")]
    fn class_handler_on_kindless_type_panics() {
        let (registry, _, _) = registry_with_types();
        let plain = registry.declare_type("Plain", None, None);
        let click = registry.register::<()>("Click", RoutingStrategy::Bubble, plain);
        registry.register_class_handler(plain, click, |_, _| {}, false);
    }

    #[test]
    fn class_handlers_resolve_through_base_chain() {
        let (registry, element, button) = registry_with_types();
        let click = registry.register::<()>("Click", RoutingStrategy::Bubble, element);
        let log = Arc::new(Mutex::new(Vec::new()));

        let tag = Arc::clone(&log);
        registry.register_class_handler(element, click, move |_, _| tag.lock().unwrap().push("element"), false);

        let list = registry.class_handlers(button, click.id());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn late_registration_reaches_observed_subtype() {
        let (registry, element, button) = registry_with_types();
        let click = registry.register::<()>("Click", RoutingStrategy::Bubble, element);

        // Dispatch against the subtype before any class handler exists.
        assert!(registry.class_handlers(button, click.id()).is_empty());

        registry.register_class_handler(element, click, |_, _| {}, false);
        assert_eq!(registry.class_handlers(button, click.id()).len(), 1);
    }

    #[test]
    #[should_panic(expected = "payload type does not match")]
    fn make_args_rejects_wrong_payload() {
        let (registry, element, _) = registry_with_types();
        let click = registry.register::<String>("Click", RoutingStrategy::Bubble, element);
        let _ = registry.make_args(click.id(), ErasedPayload::new(5_u32));
    }

    #[test]
    fn make_args_accepts_declared_payload() {
        let (registry, element, _) = registry_with_types();
        let click = registry.register::<String>("Click", RoutingStrategy::Bubble, element);
        let args = registry.make_args(click.id(), ErasedPayload::new(String::from("ok")));
        assert_eq!(args.payload_ref::<String>().map(String::as_str), Some("ok"));
    }

    #[test]
    fn global_registry_init_once() {
        static CELL: GlobalRegistry<u32> = GlobalRegistry::new();
        assert!(CELL.get().is_none());
        let first = CELL.init() as *const _;
        let second = CELL.init() as *const _;
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_registration_is_serialized() {
        let registry: Arc<EventRegistry<u32>> = Arc::new(EventRegistry::new());
        let owner = registry.declare_type("Element", None, Some(TargetKind::Visual));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let name: &'static str = Box::leak(format!("Event{i}").into_boxed_str());
                    registry.register::<()>(name, RoutingStrategy::Bubble, owner)
                })
            })
            .collect();

        let mut indices: Vec<u32> = handles
            .into_iter()
            .map(|h| h.join().unwrap().id().index())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 8, "indices must be unique");
        assert_eq!(registry.len(), 8);
    }
}
