// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler representations.
//!
//! Instance handlers live in a node's [`HandlerStore`](crate::HandlerStore)
//! and run on the dispatcher thread, so they are plain `Rc` closures. Class
//! handlers live in the shared [`EventRegistry`](crate::EventRegistry) and
//! must be `Send + Sync`. [`Handler`] is the route-level sum of the two.
//!
//! Handler identity is pointer identity: removal matches the exact `Rc`/`Arc`
//! that was added, never a structurally-equal closure.

use core::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::args::EventArgs;

/// An instance handler attached to one node's handler store.
pub type InstanceHandler<K> = Rc<dyn Fn(K, &mut EventArgs<K>)>;

/// A class handler shared through the registry across threads.
pub type SharedHandler<K> = Arc<dyn Fn(K, &mut EventArgs<K>) + Send + Sync>;

/// A private (non-routed) callback attached under a
/// [`PrivateKey`](crate::PrivateKey) slot.
pub type Callback<K> = Rc<dyn Fn(K)>;

/// Either flavor of routed-event handler, as stored in an
/// [`EventRoute`](crate::EventRoute).
pub enum Handler<K> {
    /// An instance handler from a node's handler store.
    Instance(InstanceHandler<K>),
    /// A class handler resolved through the registry.
    Class(SharedHandler<K>),
}

impl<K: Copy + Eq> Handler<K> {
    /// Invokes the handler for `target`.
    #[inline]
    pub fn invoke(&self, target: K, args: &mut EventArgs<K>) {
        match self {
            Self::Instance(f) => f(target, args),
            Self::Class(f) => f(target, args),
        }
    }

    /// Returns `true` if `self` and `other` are the same handler object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<K> Clone for Handler<K> {
    fn clone(&self) -> Self {
        match self {
            Self::Instance(f) => Self::Instance(Rc::clone(f)),
            Self::Class(f) => Self::Class(Arc::clone(f)),
        }
    }
}

impl<K> fmt::Debug for Handler<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("Handler::Instance(..)"),
            Self::Class(_) => f.write_str("Handler::Class(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_eq_distinguishes_handlers() {
        let a: InstanceHandler<u32> = Rc::new(|_, _| {});
        let b: InstanceHandler<u32> = Rc::new(|_, _| {});

        let ha = Handler::Instance(Rc::clone(&a));
        let hb = Handler::Instance(b);

        assert!(ha.ptr_eq(&Handler::Instance(a)));
        assert!(!ha.ptr_eq(&hb));
    }

    #[test]
    fn ptr_eq_never_matches_across_kinds() {
        let instance: Handler<u32> = Handler::Instance(Rc::new(|_, _| {}));
        let class: Handler<u32> = Handler::Class(Arc::new(|_, _| {}));
        assert!(!instance.ptr_eq(&class));
    }

    #[test]
    fn clone_preserves_identity() {
        let class: Handler<u32> = Handler::Class(Arc::new(|_, _| {}));
        assert!(class.ptr_eq(&class.clone()));
    }
}
