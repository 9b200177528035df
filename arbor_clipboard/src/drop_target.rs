// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drop target: hit-test tracking and the routed event bridge.
//!
//! The platform reports enter/over/leave/drop against a window; the
//! [`DropTargetTracker`] resolves each screen point to a tree node through
//! a caller-supplied hit test and raises the Preview+Bubble pair on that
//! node. When the node under the pointer changes between two over calls,
//! the tracker synthesizes a leave on the old node followed by an enter on
//! the new one, so targets always observe balanced transitions.

use std::sync::Arc;

use arbor_events::{EventArgs, EventRegistry, EventTree, RoutedEvent, raise_event};
use arbor_transfer::DataObject;
use kurbo::Point;

use crate::effects::{DragDropEffects, DragDropKeyStates, default_drop_effect};
use crate::events::{DragDropEvents, DragEventPayload};

/// Per-drag context handed to every tracker call.
#[derive(Clone, Debug)]
pub struct DragContext {
    /// The data being dragged.
    pub data: Arc<DataObject>,
    /// Mouse-button and modifier state.
    pub key_states: DragDropKeyStates,
    /// Effects the source allows.
    pub allowed_effects: DragDropEffects,
    /// Pointer position.
    pub position: Point,
}

/// Tracks which node is under the drag and raises the routed pairs.
#[derive(Debug)]
pub struct DropTargetTracker<K> {
    current: Option<K>,
}

impl<K> Default for DropTargetTracker<K> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<K: Copy + Eq + 'static> DropTargetTracker<K> {
    /// Creates a tracker with no current target.
    #[must_use]
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Returns the node currently under the drag, if any.
    #[must_use]
    pub fn current_target(&self) -> Option<K> {
        self.current
    }

    /// Handles a platform enter/over notification.
    ///
    /// `hit_test` resolves the context's position to a node. Target changes
    /// synthesize leave-then-enter; the return value is the effect the
    /// target chose (the default policy when no handler spoke up), empty
    /// when nothing is hit.
    pub fn drag_over<T: EventTree<K> + ?Sized>(
        &mut self,
        tree: &T,
        registry: &EventRegistry<K>,
        events: &DragDropEvents,
        hit_test: impl Fn(Point) -> Option<K>,
        context: &DragContext,
    ) -> DragDropEffects {
        let hit = hit_test(context.position);
        if hit != self.current {
            if let Some(old) = self.current.take() {
                raise_pair(
                    tree,
                    registry,
                    old,
                    events.preview_drag_leave,
                    events.drag_leave,
                    context,
                );
            }
            if let Some(new) = hit {
                raise_pair(
                    tree,
                    registry,
                    new,
                    events.preview_drag_enter,
                    events.drag_enter,
                    context,
                );
            }
            self.current = hit;
        }

        let Some(target) = self.current else {
            return DragDropEffects::empty();
        };
        raise_pair(
            tree,
            registry,
            target,
            events.preview_drag_over,
            events.drag_over,
            context,
        )
    }

    /// Handles a platform leave notification.
    pub fn drag_leave<T: EventTree<K> + ?Sized>(
        &mut self,
        tree: &T,
        registry: &EventRegistry<K>,
        events: &DragDropEvents,
        context: &DragContext,
    ) {
        if let Some(old) = self.current.take() {
            raise_pair(
                tree,
                registry,
                old,
                events.preview_drag_leave,
                events.drag_leave,
                context,
            );
        }
    }

    /// Handles the platform drop, ending the tracked drag.
    ///
    /// Returns the effect the target performed; empty when no node was
    /// under the drag.
    pub fn perform_drop<T: EventTree<K> + ?Sized>(
        &mut self,
        tree: &T,
        registry: &EventRegistry<K>,
        events: &DragDropEvents,
        context: &DragContext,
    ) -> DragDropEffects {
        let Some(target) = self.current.take() else {
            return DragDropEffects::empty();
        };
        raise_pair(
            tree,
            registry,
            target,
            events.preview_drop,
            events.drop,
            context,
        )
    }
}

/// Raises a Preview+Bubble pair on `target`, sharing one args object, and
/// returns the chosen effect.
fn raise_pair<K: Copy + Eq + 'static, T: EventTree<K> + ?Sized>(
    tree: &T,
    registry: &EventRegistry<K>,
    target: K,
    preview: RoutedEvent<DragEventPayload>,
    main: RoutedEvent<DragEventPayload>,
    context: &DragContext,
) -> DragDropEffects {
    let default = default_drop_effect(context.allowed_effects, context.key_states);
    let payload = DragEventPayload {
        data: Arc::clone(&context.data),
        key_states: context.key_states,
        allowed_effects: context.allowed_effects,
        effects: default,
        position: context.position,
    };
    let mut args = EventArgs::new(preview, payload);
    raise_event(tree, registry, target, &mut args);
    args.set_event(main);
    raise_event(tree, registry, target, &mut args);

    if args.handled() {
        args.payload_ref::<DragEventPayload>().unwrap().effects
    } else {
        default
    }
}
