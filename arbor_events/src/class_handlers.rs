// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class handler storage with push-based cache invalidation.
//!
//! Class handlers attach to a target *type* rather than a node. Dispatch
//! wants the full merged list for a concrete type — its own handlers plus
//! everything inherited from base types — without walking the chain every
//! time, so resolved lists are cached per `(type, event)`.
//!
//! The cache must stay consistent at registration time, not lazily: dispatch
//! assumes a warm entry is already correct. Registering a handler on a base
//! type therefore eagerly recomputes every previously observed type that
//! derives from it.

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::event::EventId;
use crate::handler::SharedHandler;
use crate::target::{TargetType, TypeTable};

/// One class handler registration.
pub struct ClassHandlerEntry<K> {
    /// The handler to invoke.
    pub handler: SharedHandler<K>,
    /// Whether the handler observes already-handled events.
    pub handled_events_too: bool,
}

impl<K> Clone for ClassHandlerEntry<K> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            handled_events_too: self.handled_events_too,
        }
    }
}

impl<K> fmt::Debug for ClassHandlerEntry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassHandlerEntry")
            .field("handled_events_too", &self.handled_events_too)
            .finish_non_exhaustive()
    }
}

/// Per-type class handler lists plus the resolved-per-concrete-type cache.
pub(crate) struct ClassHandlerStore<K> {
    /// Handlers registered directly on a type, in registration order.
    direct: HashMap<(TargetType, EventId), Vec<ClassHandlerEntry<K>>>,
    /// Merged chain lists for every `(type, event)` ever resolved.
    ///
    /// Empty lists are cached too: a type observed with no handlers must
    /// still receive pushed updates when a base type gains one later.
    resolved: HashMap<(TargetType, EventId), Arc<[ClassHandlerEntry<K>]>>,
}

impl<K> ClassHandlerStore<K> {
    pub(crate) fn new() -> Self {
        Self {
            direct: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// Registers a class handler and pushes the update to every observed
    /// subtype of `class_type`.
    pub(crate) fn register(
        &mut self,
        class_type: TargetType,
        event: EventId,
        entry: ClassHandlerEntry<K>,
        types: &TypeTable,
    ) {
        self.direct
            .entry((class_type, event))
            .or_default()
            .push(entry);

        let affected: Vec<TargetType> = self
            .resolved
            .keys()
            .filter(|(ty, ev)| *ev == event && types.is_same_or_subtype(*ty, class_type))
            .map(|(ty, _)| *ty)
            .collect();
        for ty in affected {
            let merged = self.merge(ty, event, types);
            self.resolved.insert((ty, event), merged);
        }
    }

    /// Returns the cached merged list for `(target_type, event)`, if warm.
    pub(crate) fn peek(
        &self,
        target_type: TargetType,
        event: EventId,
    ) -> Option<Arc<[ClassHandlerEntry<K>]>> {
        self.resolved.get(&(target_type, event)).map(Arc::clone)
    }

    /// Returns the merged list for `(target_type, event)`, computing and
    /// caching it on first observation.
    pub(crate) fn resolve(
        &mut self,
        target_type: TargetType,
        event: EventId,
        types: &TypeTable,
    ) -> Arc<[ClassHandlerEntry<K>]> {
        if let Some(list) = self.resolved.get(&(target_type, event)) {
            return Arc::clone(list);
        }
        let merged = self.merge(target_type, event, types);
        self.resolved
            .insert((target_type, event), Arc::clone(&merged));
        merged
    }

    /// Merges the chain for `target_type`: subclass handlers first (they
    /// take precedence), registration order within one type.
    fn merge(
        &self,
        target_type: TargetType,
        event: EventId,
        types: &TypeTable,
    ) -> Arc<[ClassHandlerEntry<K>]> {
        let mut out = Vec::new();
        for ty in types.base_chain(target_type) {
            if let Some(list) = self.direct.get(&(ty, event)) {
                out.extend(list.iter().cloned());
            }
        }
        out.into()
    }
}

impl<K> fmt::Debug for ClassHandlerStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassHandlerStore")
            .field("direct", &self.direct.len())
            .field("resolved", &self.resolved.len())
            .finish()
    }
}
