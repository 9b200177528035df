// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Route construction over a narrow tree-walk interface.
//!
//! The event core does not own the tree. Node types expose just enough
//! through [`EventTree`] — parent links, target types, handler stores, and
//! source-override points — and [`build_route`] walks target-to-root adding
//! class handlers (resolved through the registry) before instance handlers
//! at each node.

use std::rc::Rc;
use std::sync::Arc;

use crate::args::EventArgs;
use crate::event::{EventId, RoutingStrategy};
use crate::handler::Handler;
use crate::registry::EventRegistry;
use crate::route::EventRoute;
use crate::store::HandlerStore;
use crate::target::TargetType;

/// Upper bound on route length; exceeding it means the parent chain loops.
pub const MAX_ROUTE_DEPTH: usize = 4096;

/// Tree-walk capabilities the route builder needs from node types.
pub trait EventTree<K: Copy + Eq> {
    /// Returns the parent of `node`, or `None` at the root.
    fn parent(&self, node: K) -> Option<K>;

    /// Returns the declared target type of `node`.
    fn target_type(&self, node: K) -> TargetType;

    /// Returns the node's handler store, if it has one.
    fn handler_store(&self, node: K) -> Option<&HandlerStore<K>>;

    /// Returns the effective event source for routes passing through
    /// `node`, when it differs from the original source (logical/visual
    /// tree divergence).
    fn source_override(&self, node: K) -> Option<K> {
        let _ = node;
        None
    }
}

/// Builds a route for `event` rooted at `target`.
///
/// For each visited node the route receives the merged class handlers
/// (subclass-first) followed by the node's instance handlers. `Direct`
/// events visit only the target. Source overrides reported by the tree are
/// recorded at the index where the walk enters the overriding node.
///
/// # Panics
///
/// Panics if `event` is not registered, or if the walk exceeds
/// [`MAX_ROUTE_DEPTH`] (a cyclic parent chain).
#[must_use]
pub fn build_route<K, T>(
    tree: &T,
    registry: &EventRegistry<K>,
    target: K,
    event: EventId,
) -> EventRoute<K>
where
    K: Copy + Eq + 'static,
    T: EventTree<K> + ?Sized,
{
    let Some(strategy) = registry.strategy(event) else {
        panic!("cannot build a route for unregistered event {event}");
    };
    let mut route = EventRoute::new(event, strategy);

    let mut node = target;
    let mut depth = 0_usize;
    loop {
        depth += 1;
        assert!(
            depth <= MAX_ROUTE_DEPTH,
            "route exceeded {MAX_ROUTE_DEPTH} nodes; the parent chain probably loops"
        );

        let class = registry.class_handlers(tree.target_type(node), event);
        for entry in class.iter() {
            route.add(
                node,
                Handler::Class(Arc::clone(&entry.handler)),
                entry.handled_events_too,
            );
        }
        if let Some(store) = tree.handler_store(node)
            && let Some(entries) = store.handlers_for(event)
        {
            for entry in entries {
                route.add(
                    node,
                    Handler::Instance(Rc::clone(&entry.handler)),
                    entry.handled_events_too,
                );
            }
        }

        if strategy == RoutingStrategy::Direct {
            break;
        }
        let Some(parent) = tree.parent(node) else {
            break;
        };
        if let Some(source) = tree.source_override(parent) {
            route.add_source(source);
        }
        node = parent;
    }
    route
}

/// Builds a route for the args' event and invokes it.
///
/// The target becomes the source (and original source) when the caller has
/// not set one; after invocation the source is restored to the original.
pub fn raise_event<K, T>(tree: &T, registry: &EventRegistry<K>, target: K, args: &mut EventArgs<K>)
where
    K: Copy + Eq + 'static,
    T: EventTree<K> + ?Sized,
{
    if args.source().is_none() {
        args.set_source(target);
    }
    let route = build_route(tree, registry, target, args.event());
    route.invoke_handlers(args);
    if let Some(original) = args.original_source() {
        args.set_source_routing(original);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RoutedEvent;
    use crate::target::TargetKind;
    use hashbrown::HashMap;

    type Log = Vec<&'static str>;

    struct Node {
        parent: Option<u32>,
        ty: TargetType,
        store: HandlerStore<u32>,
        source_override: Option<u32>,
    }

    struct Tree {
        nodes: HashMap<u32, Node>,
    }

    impl EventTree<u32> for Tree {
        fn parent(&self, node: u32) -> Option<u32> {
            self.nodes[&node].parent
        }

        fn target_type(&self, node: u32) -> TargetType {
            self.nodes[&node].ty
        }

        fn handler_store(&self, node: u32) -> Option<&HandlerStore<u32>> {
            self.nodes.get(&node).map(|n| &n.store)
        }

        fn source_override(&self, node: u32) -> Option<u32> {
            self.nodes[&node].source_override
        }
    }

    fn recorder(tag: &'static str) -> crate::InstanceHandler<u32> {
        Rc::new(move |_, args: &mut EventArgs<u32>| {
            args.payload_mut::<Log>().unwrap().push(tag);
        })
    }

    /// Three-node chain 1 (leaf) → 2 → 3 (root).
    fn chain(ty: TargetType) -> Tree {
        let mut nodes = HashMap::new();
        for (id, parent) in [(1, Some(2)), (2, Some(3)), (3, None)] {
            nodes.insert(
                id,
                Node {
                    parent,
                    ty,
                    store: HandlerStore::new(),
                    source_override: None,
                },
            );
        }
        Tree { nodes }
    }

    fn setup() -> (EventRegistry<u32>, TargetType, RoutedEvent<Log>) {
        let registry = EventRegistry::new();
        let element = registry.declare_type("Element", None, Some(TargetKind::Visual));
        let click = registry.register::<Log>("Click", RoutingStrategy::Bubble, element);
        (registry, element, click)
    }

    #[test]
    fn bubble_routes_leaf_to_root() {
        let (registry, element, click) = setup();
        let mut tree = chain(element);
        for (node, tag) in [(1, "leaf"), (2, "mid"), (3, "root")] {
            tree.nodes
                .get_mut(&node)
                .unwrap()
                .store
                .add_handler(click.id(), recorder(tag), false);
        }

        let mut args = EventArgs::new(click, Log::new());
        raise_event(&tree, &registry, 1, &mut args);
        assert_eq!(args.payload_ref::<Log>().unwrap(), &["leaf", "mid", "root"]);
        assert_eq!(args.source(), Some(1));
    }

    #[test]
    fn tunnel_routes_root_to_leaf() {
        let (registry, element, _) = setup();
        let preview = registry.register::<Log>("PreviewClick", RoutingStrategy::Tunnel, element);
        let mut tree = chain(element);
        for (node, tag) in [(1, "leaf"), (2, "mid"), (3, "root")] {
            tree.nodes
                .get_mut(&node)
                .unwrap()
                .store
                .add_handler(preview.id(), recorder(tag), false);
        }

        let mut args = EventArgs::new(preview, Log::new());
        raise_event(&tree, &registry, 1, &mut args);
        assert_eq!(args.payload_ref::<Log>().unwrap(), &["root", "mid", "leaf"]);
    }

    #[test]
    fn class_handlers_precede_instance_handlers() {
        let (registry, element, click) = setup();
        let mut tree = chain(element);
        tree.nodes
            .get_mut(&1)
            .unwrap()
            .store
            .add_handler(click.id(), recorder("instance"), false);
        registry.register_class_handler(
            element,
            click,
            |_, args: &mut EventArgs<u32>| args.payload_mut::<Log>().unwrap().push("class"),
            false,
        );

        let mut args = EventArgs::new(click, Log::new());
        raise_event(&tree, &registry, 1, &mut args);
        // Class then instance at the leaf, then the ancestors' class
        // handlers (they have no instance handlers).
        assert_eq!(
            args.payload_ref::<Log>().unwrap(),
            &["class", "instance", "class", "class"]
        );
    }

    #[test]
    fn direct_visits_only_the_target() {
        let (registry, element, _) = setup();
        let direct = registry.register::<Log>("Loaded", RoutingStrategy::Direct, element);
        let mut tree = chain(element);
        for (node, tag) in [(1, "leaf"), (2, "mid")] {
            tree.nodes
                .get_mut(&node)
                .unwrap()
                .store
                .add_handler(direct.id(), recorder(tag), false);
        }

        let mut args = EventArgs::new(direct, Log::new());
        raise_event(&tree, &registry, 1, &mut args);
        assert_eq!(args.payload_ref::<Log>().unwrap(), &["leaf"]);
    }

    #[test]
    fn source_override_recorded_at_divergence() {
        let (registry, element, _) = setup();
        let hosted: RoutedEvent<Vec<u32>> =
            registry.register("Hosted", RoutingStrategy::Bubble, element);
        let mut tree = chain(element);
        tree.nodes.get_mut(&2).unwrap().source_override = Some(2);
        for node in [1, 2, 3] {
            let handler: crate::InstanceHandler<u32> =
                Rc::new(move |_, args: &mut EventArgs<u32>| {
                    let source = args.source().unwrap();
                    args.payload_mut::<Vec<u32>>().unwrap().push(source);
                });
            tree.nodes
                .get_mut(&node)
                .unwrap()
                .store
                .add_handler(hosted.id(), handler, false);
        }

        let mut args = EventArgs::new(hosted, Vec::new());
        raise_event(&tree, &registry, 1, &mut args);
        // The leaf sees itself; everything at and above the divergence sees
        // the override.
        assert_eq!(args.payload_ref::<Vec<u32>>().unwrap(), &[1, 2, 2]);
        // Source restored after dispatch.
        assert_eq!(args.source(), Some(1));
    }

    #[test]
    #[should_panic(expected = "parent chain probably loops")]
    fn cyclic_parent_chain_panics() {
        let (registry, element, click) = setup();
        let mut tree = chain(element);
        tree.nodes.get_mut(&3).unwrap().parent = Some(1);

        let mut args = EventArgs::new(click, Log::new());
        raise_event(&tree, &registry, 1, &mut args);
    }

    #[test]
    #[should_panic(expected = "unregistered event")]
    fn unregistered_event_panics() {
        let (registry, element, _) = setup();
        let tree = chain(element);
        let _ = build_route(&tree, &registry, 1, EventId::new(999));
    }
}
