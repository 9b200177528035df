// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The routed drag-and-drop event set.
//!
//! Every drag-and-drop notification arrives as a Preview/main pair: the
//! preview tunnels from the root toward the node, the main event bubbles
//! back up. One args object serves both raises, so a preview handler that
//! marks the event handled suppresses main-phase handlers that did not opt
//! into handled events.
//!
//! Drag started/completed are plain callbacks under private keys, not
//! routed events: they are source-local notifications with no propagation.

use std::sync::Arc;

use arbor_events::{EventRegistry, PrivateKey, RoutedEvent, RoutingStrategy, TargetType};
use arbor_transfer::DataObject;
use kurbo::Point;

use crate::effects::{DragAction, DragDropEffects, DragDropKeyStates};

/// Payload of the drag enter/over/leave/drop pairs.
#[derive(Clone, Debug)]
pub struct DragEventPayload {
    /// The data being dragged.
    pub data: Arc<DataObject>,
    /// Mouse-button and modifier state.
    pub key_states: DragDropKeyStates,
    /// Effects the source allows.
    pub allowed_effects: DragDropEffects,
    /// Effect the target chose; pre-seeded with the default policy.
    pub effects: DragDropEffects,
    /// Pointer position in the target's coordinate space.
    pub position: Point,
}

/// Payload of the query-continue pair.
#[derive(Clone, Debug)]
pub struct QueryContinuePayload {
    /// Whether Escape is down.
    pub escape_pressed: bool,
    /// Mouse-button and modifier state.
    pub key_states: DragDropKeyStates,
    /// The action a handler chose; honored only when the event is handled.
    pub action: DragAction,
}

/// Payload of the give-feedback pair.
#[derive(Clone, Debug)]
pub struct GiveFeedbackPayload {
    /// The effect the target reported.
    pub effects: DragDropEffects,
    /// Whether the platform should show its default cursors.
    pub use_default_cursors: bool,
}

/// The registered drag-and-drop events, plus the source-local notification
/// keys.
#[derive(Copy, Clone, Debug)]
pub struct DragDropEvents {
    /// Tunneling continue/cancel query toward the drag source.
    pub preview_query_continue_drag: RoutedEvent<QueryContinuePayload>,
    /// Bubbling continue/cancel query on the drag source.
    pub query_continue_drag: RoutedEvent<QueryContinuePayload>,
    /// Tunneling cursor feedback toward the drag source.
    pub preview_give_feedback: RoutedEvent<GiveFeedbackPayload>,
    /// Bubbling cursor feedback on the drag source.
    pub give_feedback: RoutedEvent<GiveFeedbackPayload>,
    /// Tunneling enter on the drop target.
    pub preview_drag_enter: RoutedEvent<DragEventPayload>,
    /// Bubbling enter on the drop target.
    pub drag_enter: RoutedEvent<DragEventPayload>,
    /// Tunneling over on the drop target.
    pub preview_drag_over: RoutedEvent<DragEventPayload>,
    /// Bubbling over on the drop target.
    pub drag_over: RoutedEvent<DragEventPayload>,
    /// Tunneling leave on the drop target.
    pub preview_drag_leave: RoutedEvent<DragEventPayload>,
    /// Bubbling leave on the drop target.
    pub drag_leave: RoutedEvent<DragEventPayload>,
    /// Tunneling drop on the drop target.
    pub preview_drop: RoutedEvent<DragEventPayload>,
    /// Bubbling drop on the drop target.
    pub drop: RoutedEvent<DragEventPayload>,
    /// Source-local notification: the drag loop is starting.
    pub drag_started: PrivateKey,
    /// Source-local notification: the drag loop finished.
    pub drag_completed: PrivateKey,
}

impl DragDropEvents {
    /// Registers the full event set on `owner`.
    ///
    /// Call once at startup; the returned struct is `Copy` and cheap to
    /// hand around.
    #[must_use]
    pub fn register<K: Copy + Eq + 'static>(
        registry: &EventRegistry<K>,
        owner: TargetType,
    ) -> Self {
        Self {
            preview_query_continue_drag: registry.register(
                "PreviewQueryContinueDrag",
                RoutingStrategy::Tunnel,
                owner,
            ),
            query_continue_drag: registry.register(
                "QueryContinueDrag",
                RoutingStrategy::Bubble,
                owner,
            ),
            preview_give_feedback: registry.register(
                "PreviewGiveFeedback",
                RoutingStrategy::Tunnel,
                owner,
            ),
            give_feedback: registry.register("GiveFeedback", RoutingStrategy::Bubble, owner),
            preview_drag_enter: registry.register(
                "PreviewDragEnter",
                RoutingStrategy::Tunnel,
                owner,
            ),
            drag_enter: registry.register("DragEnter", RoutingStrategy::Bubble, owner),
            preview_drag_over: registry.register("PreviewDragOver", RoutingStrategy::Tunnel, owner),
            drag_over: registry.register("DragOver", RoutingStrategy::Bubble, owner),
            preview_drag_leave: registry.register(
                "PreviewDragLeave",
                RoutingStrategy::Tunnel,
                owner,
            ),
            drag_leave: registry.register("DragLeave", RoutingStrategy::Bubble, owner),
            preview_drop: registry.register("PreviewDrop", RoutingStrategy::Tunnel, owner),
            drop: registry.register("Drop", RoutingStrategy::Bubble, owner),
            drag_started: registry.allocate_private_key(),
            drag_completed: registry.allocate_private_key(),
        }
    }
}
