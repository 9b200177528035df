// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arbor Clipboard: OS clipboard and drag-and-drop facades.
//!
//! Two thin facades over the Arbor cores:
//!
//! - [`Clipboard`] wraps a [`PlatformClipboard`] with a bounded
//!   retry-on-lock policy and format-name sugar over
//!   [`arbor_transfer::DataObject`].
//! - [`do_drag_drop`] runs a blocking [`PlatformDragLoop`] while bridging
//!   the platform's source callbacks, and [`DropTargetTracker`] bridges the
//!   target side, both raising Preview+Bubble routed event pairs through
//!   [`arbor_events`].
//!
//! Platform bindings stay behind the two traits; everything above them —
//! retry policy, default drag policies, enter/leave synthesis, event
//! plumbing — is pure logic, exercised in-memory by the tests.
//!
//! ## Drag-and-drop flow
//!
//! ```text
//! do_drag_drop(source, data, allowed)
//!   ├─ drag-started callback on the source
//!   ├─ PlatformDragLoop::run (blocking)
//!   │    ├─ query_continue → PreviewQueryContinueDrag + QueryContinueDrag
//!   │    ├─ give_feedback  → PreviewGiveFeedback + GiveFeedback
//!   │    └─ target side    → DropTargetTracker::drag_over / drop
//!   │         └─ Preview+Bubble Enter/Over/Leave/Drop on the hit node
//!   └─ drag-completed callback on the source
//! ```

mod clipboard;
mod drag;
mod drop_target;
mod effects;
mod events;

pub use clipboard::{
    CLIPBOARD_LOCKED, Clipboard, ClipboardError, NativeError, PlatformClipboard, RETRY_COUNT,
    RETRY_DELAY,
};
pub use drag::{
    DragData, DragSourceFeedback, PlatformDragLoop, do_drag_drop,
};
pub use drop_target::{DragContext, DropTargetTracker};
pub use effects::{
    DragAction, DragDropEffects, DragDropKeyStates, default_drop_effect, default_query_continue,
};
pub use events::{DragDropEvents, DragEventPayload, GiveFeedbackPayload, QueryContinuePayload};
