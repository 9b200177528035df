// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Events: routed-event registration, storage, and dispatch.
//!
//! A routed event's delivery is determined by a tree-walk route rather than
//! a single object: a dispatch builds an ordered list of (target, handler)
//! pairs over the target's ancestor chain and invokes them in strategy
//! order — root-to-leaf for `Tunnel`, leaf-to-root for `Bubble`, or the
//! target alone for `Direct`.
//!
//! ## Core Concepts
//!
//! ### Event identity
//!
//! [`EventRegistry::register`] assigns each event a unique, never-reused
//! global index ([`EventId`]); [`RoutedEvent<P>`] wraps it with the payload
//! type for compile-time checked registration and args construction. Target
//! types are arena-indexed descriptors ([`TargetType`]) with a
//! single-inheritance base chain, declared in the same registry.
//!
//! ### Handlers
//!
//! Instance handlers live in a per-node [`HandlerStore`] keyed by global
//! index. Class handlers attach to a [`TargetType`] through the registry
//! and fire for every instance of that type and its subtypes, before
//! instance handlers at the same node; resolved per-type lists are cached
//! and eagerly updated when a later registration lands on a base type.
//!
//! ### Routes
//!
//! [`build_route`] walks a tree exposed through the narrow [`EventTree`]
//! trait and materializes an [`EventRoute`]; [`raise_event`] builds and
//! invokes in one step. Routes record source overrides where the logical
//! and visual trees diverge, so handlers above the divergence observe the
//! hosting element rather than the inner target.
//!
//! ## Quick Start
//!
//! ```rust
//! use arbor_events::{
//!     EventArgs, EventRegistry, EventRoute, Handler, RoutingStrategy, TargetKind,
//! };
//! use std::rc::Rc;
//!
//! let registry: EventRegistry<u32> = EventRegistry::new();
//! let element = registry.declare_type("Element", None, Some(TargetKind::Visual));
//! let click = registry.register::<Vec<u32>>("Click", RoutingStrategy::Bubble, element);
//!
//! // Routes are normally built by walking a tree; build one by hand here.
//! let mut route: EventRoute<u32> = EventRoute::new(click.id(), RoutingStrategy::Bubble);
//! for node in [1, 2, 3] {
//!     route.add(
//!         node,
//!         Handler::Instance(Rc::new(|k, args: &mut EventArgs<u32>| {
//!             args.payload_mut::<Vec<u32>>().unwrap().push(k);
//!         })),
//!         false,
//!     );
//! }
//!
//! let mut args = EventArgs::new(click, Vec::new());
//! args.set_source(1);
//! route.invoke_handlers(&mut args);
//! assert_eq!(args.payload_ref::<Vec<u32>>().unwrap(), &[1, 2, 3]);
//! ```
//!
//! ## Concurrency
//!
//! Route construction and invocation are single-threaded (dispatcher
//! affine); handlers may trigger nested dispatches. The registry is the one
//! piece of shared global state: registration can race from type
//! initializers at startup, so all mutation is serialized behind one lock
//! and warm class-handler lookups stay on the shared read path.

mod args;
mod builder;
mod class_handlers;
mod event;
mod handler;
mod registry;
mod route;
mod store;
mod target;

pub use args::{ErasedPayload, EventArgs};
pub use builder::{EventTree, MAX_ROUTE_DEPTH, build_route, raise_event};
pub use class_handlers::ClassHandlerEntry;
pub use event::{EventId, PrivateKey, RoutedEvent, RoutingStrategy};
pub use handler::{Callback, Handler, InstanceHandler, SharedHandler};
pub use registry::{EventInfo, EventRegistry, GlobalRegistry};
pub use route::EventRoute;
pub use store::{HandlerStore, RoutedEntry};
pub use target::{BaseChain, TargetKind, TargetType, TypeTable};
