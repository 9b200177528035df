// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag source: [`do_drag_drop`] and the feedback bridge.
//!
//! [`do_drag_drop`] runs the blocking platform drag loop. While the loop
//! pumps, the platform asks the source two questions — keep going? what
//! cursor? — and the bridge answers each by raising the Preview+Bubble
//! routed event pair on the source node. When no handler marks the event
//! handled, the default policies apply: Escape or a second mouse button
//! cancels, releasing every button drops, and cursors stay native.
//!
//! Cancellation is cooperative through the query-continue callback only;
//! the loop itself is not preemptible.

use std::sync::Arc;

use arbor_events::{EventArgs, EventRegistry, EventTree, raise_event};
use arbor_transfer::{DataObject, TransferValue};

use crate::effects::{DragAction, DragDropEffects, DragDropKeyStates, default_query_continue};
use crate::events::{DragDropEvents, GiveFeedbackPayload, QueryContinuePayload};

/// Answers the platform's drag-source callbacks.
pub trait DragSourceFeedback {
    /// Decides whether the drag continues, drops, or cancels.
    fn query_continue(&mut self, escape_pressed: bool, key_states: DragDropKeyStates)
    -> DragAction;

    /// Reports the target's current effect; returns `true` when the
    /// platform should keep its default cursors.
    fn give_feedback(&mut self, effects: DragDropEffects) -> bool;
}

/// The blocking native drag loop.
///
/// One implementation exists per target OS; tests use scripted fakes. The
/// loop pumps its own messages, consults `feedback` as the mouse moves, and
/// returns the effect the drop target performed (empty on cancel).
pub trait PlatformDragLoop {
    /// Runs the loop to completion.
    fn run(
        &mut self,
        data: &Arc<DataObject>,
        allowed_effects: DragDropEffects,
        feedback: &mut dyn DragSourceFeedback,
    ) -> Result<DragDropEffects, i32>;
}

/// Data accepted by [`do_drag_drop`]: an existing data object, or a bare
/// value that gets wrapped in one.
#[derive(Debug)]
pub enum DragData {
    /// An existing data object, used as-is.
    Object(Arc<DataObject>),
    /// A bare value; wrapped under its natural format.
    Value(TransferValue),
}

impl From<Arc<DataObject>> for DragData {
    fn from(data: Arc<DataObject>) -> Self {
        Self::Object(data)
    }
}

impl From<TransferValue> for DragData {
    fn from(value: TransferValue) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for DragData {
    fn from(text: &str) -> Self {
        Self::Value(text.into())
    }
}

/// Runs a drag-and-drop operation from `source`.
///
/// The source's private-key callbacks fire around the loop: drag-started
/// before it enters, drag-completed after it returns (on both success and
/// failure paths). The result is the effect the target performed; a
/// canceled or failed drag reports the empty effect.
pub fn do_drag_drop<K, T, L>(
    tree: &T,
    registry: &EventRegistry<K>,
    platform: &mut L,
    events: &DragDropEvents,
    source: K,
    data: impl Into<DragData>,
    allowed_effects: DragDropEffects,
) -> DragDropEffects
where
    K: Copy + Eq + 'static,
    T: EventTree<K> + ?Sized,
    L: PlatformDragLoop + ?Sized,
{
    let data = match data.into() {
        DragData::Object(data) => data,
        DragData::Value(value) => Arc::new(DataObject::with_value(value)),
    };

    notify(tree, source, events.drag_started);
    tracing::debug!("drag loop starting");

    let mut feedback = RoutedDragSource {
        tree,
        registry,
        events,
        source,
    };
    let result = platform.run(&data, allowed_effects, &mut feedback);

    notify(tree, source, events.drag_completed);
    match result {
        Ok(effect) => {
            tracing::debug!(?effect, "drag loop finished");
            effect
        }
        Err(code) => {
            tracing::warn!(code, "drag loop aborted");
            DragDropEffects::empty()
        }
    }
}

fn notify<K: Copy + Eq, T: EventTree<K> + ?Sized>(
    tree: &T,
    source: K,
    key: arbor_events::PrivateKey,
) {
    if let Some(store) = tree.handler_store(source) {
        store.invoke_callbacks(key, source);
    }
}

/// Bridges platform callbacks into the routed Preview+Bubble pairs.
struct RoutedDragSource<'a, K: Copy + Eq + 'static, T: EventTree<K> + ?Sized> {
    tree: &'a T,
    registry: &'a EventRegistry<K>,
    events: &'a DragDropEvents,
    source: K,
}

impl<K: Copy + Eq + 'static, T: EventTree<K> + ?Sized> DragSourceFeedback
    for RoutedDragSource<'_, K, T>
{
    fn query_continue(
        &mut self,
        escape_pressed: bool,
        key_states: DragDropKeyStates,
    ) -> DragAction {
        let payload = QueryContinuePayload {
            escape_pressed,
            key_states,
            action: DragAction::Continue,
        };
        let mut args = EventArgs::new(self.events.preview_query_continue_drag, payload);
        raise_event(self.tree, self.registry, self.source, &mut args);
        args.set_event(self.events.query_continue_drag);
        raise_event(self.tree, self.registry, self.source, &mut args);

        if args.handled() {
            args.payload_ref::<QueryContinuePayload>().unwrap().action
        } else {
            default_query_continue(escape_pressed, key_states)
        }
    }

    fn give_feedback(&mut self, effects: DragDropEffects) -> bool {
        let payload = GiveFeedbackPayload {
            effects,
            use_default_cursors: true,
        };
        let mut args = EventArgs::new(self.events.preview_give_feedback, payload);
        raise_event(self.tree, self.registry, self.source, &mut args);
        args.set_event(self.events.give_feedback);
        raise_event(self.tree, self.registry, self.source, &mut args);

        if args.handled() {
            args.payload_ref::<GiveFeedbackPayload>()
                .unwrap()
                .use_default_cursors
        } else {
            true
        }
    }
}
