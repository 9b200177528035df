// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The materialized dispatch route.
//!
//! An [`EventRoute`] is the ordered list of (target, handler) pairs for one
//! dispatch, built by walking the tree and consumed once. Items are always
//! appended in target-to-root order; the routing strategy decides how they
//! are consumed:
//!
//! - Bubble and Direct invoke items in construction order.
//! - Tunnel invokes in reverse, but grouped by contiguous same-target runs
//!   so that handlers *within* one node still fire in class-then-instance
//!   registration order.
//!
//! Source overrides recorded with [`EventRoute::add_source`] take effect for
//! every item at or past their start index; the effective source for item
//! `i` is the last override whose start index is `<= i`, or the original
//! source when none covers it.

use core::fmt;

use crate::args::EventArgs;
use crate::event::{EventId, RoutingStrategy};
use crate::handler::Handler;

struct RouteItem<K> {
    target: K,
    handler: Handler<K>,
    handled_events_too: bool,
}

struct SourceItem<K> {
    start_index: usize,
    source: K,
}

/// An ordered dispatch route for one event.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use arbor_events::{EventArgs, EventId, EventRoute, Handler, RoutedEvent, RoutingStrategy};
///
/// let id = EventId::new(0);
/// let event: RoutedEvent<Vec<u32>> = RoutedEvent::from_id(id);
///
/// // Target-to-root construction order: leaf 1, then its parent 2.
/// let mut route: EventRoute<u32> = EventRoute::new(id, RoutingStrategy::Bubble);
/// for node in [1, 2] {
///     route.add(
///         node,
///         Handler::Instance(Rc::new(|k, args: &mut EventArgs<u32>| {
///             args.payload_mut::<Vec<u32>>().unwrap().push(k);
///         })),
///         false,
///     );
/// }
///
/// let mut args = EventArgs::new(event, Vec::new());
/// args.set_source(1);
/// route.invoke_handlers(&mut args);
/// assert_eq!(args.payload_ref::<Vec<u32>>().unwrap(), &[1, 2]);
/// ```
pub struct EventRoute<K> {
    event: EventId,
    strategy: RoutingStrategy,
    items: Vec<RouteItem<K>>,
    sources: Vec<SourceItem<K>>,
    branches: Vec<(K, K)>,
}

impl<K: Copy + Eq> EventRoute<K> {
    /// Creates an empty route for `event`.
    #[must_use]
    pub fn new(event: EventId, strategy: RoutingStrategy) -> Self {
        Self {
            event,
            strategy,
            items: Vec::new(),
            sources: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Returns the event this route was built for.
    #[must_use]
    #[inline]
    pub fn event(&self) -> EventId {
        self.event
    }

    /// Returns the routing strategy driving invocation order.
    #[must_use]
    #[inline]
    pub fn strategy(&self) -> RoutingStrategy {
        self.strategy
    }

    /// Returns the number of route items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the route holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a (target, handler) pair in tree-walk order.
    pub fn add(&mut self, target: K, handler: Handler<K>, handled_events_too: bool) {
        self.items.push(RouteItem {
            target,
            handler,
            handled_events_too,
        });
    }

    /// Records a source override taking effect at the current item index.
    pub fn add_source(&mut self, source: K) {
        self.sources.push(SourceItem {
            start_index: self.items.len(),
            source,
        });
    }

    /// Empties the route for reuse.
    pub fn clear(&mut self) {
        self.items.clear();
        self.sources.clear();
        self.branches.clear();
    }

    // =========================================================================
    // Branch nodes
    // =========================================================================

    /// Pushes a (node, source) pair at a tree-branch point.
    ///
    /// Tree walkers use the branch stack to restore source context after
    /// descending into a subtree whose logical and visual parents differ.
    /// Invocation does not consume it.
    pub fn push_branch_node(&mut self, node: K, source: K) {
        self.branches.push((node, source));
    }

    /// Pops the most recent branch pair.
    pub fn pop_branch_node(&mut self) -> Option<(K, K)> {
        self.branches.pop()
    }

    /// Returns the node of the most recent branch pair.
    #[must_use]
    pub fn peek_branch_node(&self) -> Option<K> {
        self.branches.last().map(|(node, _)| *node)
    }

    /// Returns the source of the most recent branch pair.
    #[must_use]
    pub fn peek_branch_source(&self) -> Option<K> {
        self.branches.last().map(|(_, source)| *source)
    }

    // =========================================================================
    // Invocation
    // =========================================================================

    /// Invokes the route's handlers in strategy order, deriving the
    /// effective source per item.
    ///
    /// Handlers observing `args.handled() == true` are skipped unless they
    /// were added with `handled_events_too`.
    ///
    /// # Panics
    ///
    /// Panics if the args have no source, or were built for a different
    /// event.
    pub fn invoke_handlers(&self, args: &mut EventArgs<K>) {
        self.invoke(args, true);
    }

    /// Re-runs the route without re-deriving the source per item.
    ///
    /// Used when one coarse event is re-dispatched as a more specific
    /// synthesized one; the caller is responsible for source correctness.
    pub fn re_invoke_handlers(&self, args: &mut EventArgs<K>) {
        self.invoke(args, false);
    }

    fn invoke(&self, args: &mut EventArgs<K>, derive_source: bool) {
        assert!(
            args.source().is_some(),
            "cannot invoke a route whose args have no source"
        );
        assert!(
            args.event() == self.event,
            "event args do not match this route's event"
        );

        match self.strategy {
            RoutingStrategy::Bubble | RoutingStrategy::Direct => {
                for (i, item) in self.items.iter().enumerate() {
                    if derive_source {
                        self.apply_source(args, i);
                    }
                    self.invoke_item(item, args);
                }
            }
            RoutingStrategy::Tunnel => {
                // Walk runs of contiguous same-target items from the end;
                // each run fires in ascending order so class-then-instance
                // ordering within one node is preserved.
                let mut end = self.items.len();
                while end > 0 {
                    let run_target = self.items[end - 1].target;
                    let mut start = end - 1;
                    while start > 0 && self.items[start - 1].target == run_target {
                        start -= 1;
                    }
                    for i in start..end {
                        if derive_source {
                            self.apply_source(args, i);
                        }
                        self.invoke_item(&self.items[i], args);
                    }
                    end = start;
                }
            }
        }
    }

    fn apply_source(&self, args: &mut EventArgs<K>, index: usize) {
        let overridden = self
            .sources
            .iter()
            .rev()
            .find(|s| s.start_index <= index)
            .map(|s| s.source);
        match overridden {
            Some(source) => args.set_source_routing(source),
            None => {
                // No override covers this item; fall back to the original.
                if let Some(original) = args.original_source() {
                    args.set_source_routing(original);
                }
            }
        }
    }

    fn invoke_item(&self, item: &RouteItem<K>, args: &mut EventArgs<K>) {
        if args.handled() && !item.handled_events_too {
            return;
        }
        args.set_invoking(true);
        item.handler.invoke(item.target, args);
        args.set_invoking(false);
    }
}

impl<K: Copy + Eq + fmt::Debug> fmt::Debug for EventRoute<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRoute")
            .field("event", &self.event)
            .field("strategy", &self.strategy)
            .field("items", &self.items.len())
            .field("sources", &self.sources.len())
            .field("branches", &self.branches.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RoutedEvent;
    use std::rc::Rc;

    type Log = Vec<(&'static str, u32, Option<u32>)>;

    fn event() -> (EventId, RoutedEvent<Log>) {
        let id = EventId::new(0);
        (id, RoutedEvent::from_id(id))
    }

    fn recorder(tag: &'static str) -> Handler<u32> {
        Handler::Instance(Rc::new(move |k, args: &mut EventArgs<u32>| {
            let source = args.source();
            args.payload_mut::<Log>().unwrap().push((tag, k, source));
        }))
    }

    fn args_for(event: RoutedEvent<Log>, source: u32) -> EventArgs<u32> {
        let mut args = EventArgs::new(event, Log::new());
        args.set_source(source);
        args
    }

    #[test]
    fn bubble_invokes_in_construction_order() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Bubble);
        route.add(1, recorder("a"), false);
        route.add(2, recorder("b"), false);
        route.add(3, recorder("c"), false);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        let order: Vec<u32> = log.iter().map(|(_, k, _)| *k).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn tunnel_reverses_targets_but_not_within_a_node() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Tunnel);
        // Two handlers on the leaf, one on each ancestor.
        route.add(1, recorder("leaf-class"), false);
        route.add(1, recorder("leaf-instance"), false);
        route.add(2, recorder("mid"), false);
        route.add(3, recorder("root"), false);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        let order: Vec<&str> = log.iter().map(|(tag, _, _)| *tag).collect();
        assert_eq!(order, vec!["root", "mid", "leaf-class", "leaf-instance"]);
    }

    #[test]
    fn handled_skips_unless_handled_events_too() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Bubble);
        route.add(
            1,
            Handler::Instance(Rc::new(|_, args: &mut EventArgs<u32>| {
                args.set_handled(true);
            })),
            false,
        );
        route.add(2, recorder("skipped"), false);
        route.add(3, recorder("cleanup"), true);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        let tags: Vec<&str> = log.iter().map(|(tag, _, _)| *tag).collect();
        assert_eq!(tags, vec!["cleanup"]);
    }

    #[test]
    fn handled_reset_reexposes_the_event() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Bubble);
        route.add(
            1,
            Handler::Instance(Rc::new(|_, args: &mut EventArgs<u32>| {
                args.set_handled(true);
            })),
            false,
        );
        route.add(
            2,
            Handler::Instance(Rc::new(|_, args: &mut EventArgs<u32>| {
                args.set_handled(false);
            })),
            true,
        );
        route.add(3, recorder("ancestor"), false);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, "ancestor");
    }

    #[test]
    fn source_overrides_apply_from_their_start_index() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Bubble);
        route.add(1, recorder("a"), false);
        route.add(2, recorder("b"), false);
        // Items at index >= 2 see source 9.
        route.add_source(9);
        route.add(3, recorder("c"), false);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        let sources: Vec<Option<u32>> = log.iter().map(|(_, _, s)| *s).collect();
        assert_eq!(sources, vec![Some(1), Some(1), Some(9)]);
    }

    #[test]
    fn tunnel_sources_resolve_symmetrically() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Tunnel);
        route.add(1, recorder("a"), false);
        route.add_source(9);
        route.add(2, recorder("b"), false);
        route.add(3, recorder("c"), false);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        // Invocation order c, b, a; c and b sit past the override.
        let seen: Vec<(&str, Option<u32>)> = log.iter().map(|(t, _, s)| (*t, *s)).collect();
        assert_eq!(
            seen,
            vec![("c", Some(9)), ("b", Some(9)), ("a", Some(1))]
        );
    }

    #[test]
    fn re_invoke_keeps_the_caller_source() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Bubble);
        route.add_source(9);
        route.add(1, recorder("a"), false);

        let mut args = args_for(ev, 5);
        route.re_invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        assert_eq!(log[0].2, Some(5));
    }

    #[test]
    fn branch_stack_peek_pop() {
        let (id, _) = event();
        let mut route: EventRoute<u32> = EventRoute::new(id, RoutingStrategy::Bubble);
        route.push_branch_node(4, 7);
        route.push_branch_node(5, 8);

        assert_eq!(route.peek_branch_node(), Some(5));
        assert_eq!(route.peek_branch_source(), Some(8));
        assert_eq!(route.pop_branch_node(), Some((5, 8)));
        assert_eq!(route.pop_branch_node(), Some((4, 7)));
        assert_eq!(route.pop_branch_node(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Bubble);
        route.add(1, recorder("a"), false);
        route.add_source(9);
        route.push_branch_node(1, 1);

        route.clear();
        assert!(route.is_empty());
        assert_eq!(route.peek_branch_node(), None);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        assert!(args.payload_ref::<Log>().unwrap().is_empty());
    }

    #[test]
    #[should_panic(expected = "args have no source")]
    fn invoking_without_a_source_panics() {
        let (id, ev) = event();
        let route: EventRoute<u32> = EventRoute::new(id, RoutingStrategy::Bubble);
        let mut args = EventArgs::new(ev, Log::new());
        route.invoke_handlers(&mut args);
    }

    #[test]
    #[should_panic(expected = "do not match this route's event")]
    fn invoking_with_mismatched_event_panics() {
        let (id, _) = event();
        let route: EventRoute<u32> = EventRoute::new(id, RoutingStrategy::Bubble);
        let other: RoutedEvent<Log> = RoutedEvent::from_id(EventId::new(99));
        let mut args = args_for(other, 1);
        route.invoke_handlers(&mut args);
    }

    #[test]
    fn direct_strategy_invokes_in_order() {
        let (id, ev) = event();
        let mut route = EventRoute::new(id, RoutingStrategy::Direct);
        route.add(1, recorder("class"), false);
        route.add(1, recorder("instance"), false);

        let mut args = args_for(ev, 1);
        route.invoke_handlers(&mut args);
        let log = args.payload_ref::<Log>().unwrap();
        let tags: Vec<&str> = log.iter().map(|(t, _, _)| *t).collect();
        assert_eq!(tags, vec!["class", "instance"]);
    }
}
