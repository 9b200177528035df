// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-dispatch event payload and permission state.
//!
//! [`EventArgs`] travels down an [`EventRoute`](crate::EventRoute) carrying
//! the event identity, the current source, a type-erased payload, and a small
//! flag set. The flags gate what handlers may do mid-flight: while a
//! user-initiated dispatch is invoking a handler, third-party code must not
//! rewrite the source, but the route machinery itself still can (crossing a
//! logical/visual boundary legitimately changes the effective source).

use core::any::{Any, TypeId};
use core::fmt;

use crate::event::{EventId, RoutedEvent};

/// A type-erased event payload.
///
/// This wraps a value of any `'static` type, storing it on the heap with its
/// type information for later downcasting. Unlike a property value it is not
/// cloneable: a payload belongs to exactly one dispatch.
pub struct ErasedPayload {
    type_id: TypeId,
    inner: Box<dyn Any>,
}

impl ErasedPayload {
    /// Creates a new erased payload from a concrete value.
    #[must_use]
    pub fn new<P: 'static>(payload: P) -> Self {
        Self {
            type_id: TypeId::of::<P>(),
            inner: Box::new(payload),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained value is of type `P`.
    #[must_use]
    #[inline]
    pub fn is<P: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }

    /// Attempts to downcast to a reference of type `P`.
    #[must_use]
    pub fn downcast_ref<P: 'static>(&self) -> Option<&P> {
        self.inner.downcast_ref()
    }

    /// Attempts to downcast to a mutable reference of type `P`.
    #[must_use]
    pub fn downcast_mut<P: 'static>(&mut self) -> Option<&mut P> {
        self.inner.downcast_mut()
    }
}

impl fmt::Debug for ErasedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedPayload")
            .field("type_id", &self.type_id)
            .finish_non_exhaustive()
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct ArgsState: u8 {
        const HANDLED = 1;
        const USER_INITIATED = 1 << 1;
        const INVOKING_HANDLER = 1 << 2;
    }
}

/// Event payload plus per-dispatch routing state.
///
/// # Source and original source
///
/// The first source assignment fixes `original_source` for the lifetime of
/// the args; `source` is then rewritten by the route as it crosses
/// source-override boundaries, and restored to the original after the
/// dispatch completes.
///
/// # Handled
///
/// `handled` is normally set false→true by a handler to stop downstream
/// delivery, but a handler may also reset it true→false: a child that claimed
/// a high-level event can re-expose the low-level one to its ancestors.
/// Handlers registered with `handled_events_too` observe the event either
/// way.
pub struct EventArgs<K> {
    event: EventId,
    payload_type: TypeId,
    payload: ErasedPayload,
    source: Option<K>,
    original_source: Option<K>,
    state: ArgsState,
}

impl<K: Copy + Eq> EventArgs<K> {
    /// Creates args for a typed event with its payload.
    #[must_use]
    pub fn new<P: 'static>(event: RoutedEvent<P>, payload: P) -> Self {
        Self::from_parts(event.id(), ErasedPayload::new(payload))
    }

    /// Creates args from an already-erased payload.
    ///
    /// Callers that cannot prove the payload type statically should go
    /// through [`EventRegistry::make_args`](crate::EventRegistry::make_args),
    /// which checks the payload against the event's declared type.
    #[must_use]
    pub fn from_parts(event: EventId, payload: ErasedPayload) -> Self {
        Self {
            event,
            payload_type: payload.type_id(),
            payload,
            source: None,
            original_source: None,
            state: ArgsState::empty(),
        }
    }

    /// Returns the event these args are being dispatched as.
    #[must_use]
    #[inline]
    pub fn event(&self) -> EventId {
        self.event
    }

    /// Returns the [`TypeId`] of the payload.
    #[must_use]
    #[inline]
    pub fn payload_type(&self) -> TypeId {
        self.payload_type
    }

    /// Redirects these args to another event sharing the same payload type.
    ///
    /// Used when one coarse event is re-dispatched as a more specific one
    /// (for example a preview/main event pair sharing one args object).
    ///
    /// # Panics
    ///
    /// Panics if the payload types differ, or while a user-initiated
    /// dispatch is invoking a handler.
    pub fn set_event<P: 'static>(&mut self, event: RoutedEvent<P>) {
        self.assert_not_invoking_user_initiated("event identity");
        assert_eq!(
            TypeId::of::<P>(),
            self.payload_type,
            "replacement event must share the payload type"
        );
        self.event = event.id();
    }

    /// Returns `true` if a handler marked the event as handled.
    #[must_use]
    #[inline]
    pub fn handled(&self) -> bool {
        self.state.contains(ArgsState::HANDLED)
    }

    /// Sets or resets the handled flag.
    pub fn set_handled(&mut self, handled: bool) {
        self.state.set(ArgsState::HANDLED, handled);
    }

    /// Returns `true` if this dispatch was marked as user-initiated.
    #[must_use]
    #[inline]
    pub fn user_initiated(&self) -> bool {
        self.state.contains(ArgsState::USER_INITIATED)
    }

    /// Marks this dispatch as user-initiated.
    ///
    /// Input-system entry points set this before raising; it locks the
    /// source against reassignment while handlers run.
    pub fn mark_user_initiated(&mut self) {
        self.state.insert(ArgsState::USER_INITIATED);
    }

    /// Returns `true` while a handler is being invoked for these args.
    #[must_use]
    #[inline]
    pub fn invoking_handler(&self) -> bool {
        self.state.contains(ArgsState::INVOKING_HANDLER)
    }

    /// Returns the current effective source.
    #[must_use]
    #[inline]
    pub fn source(&self) -> Option<K> {
        self.source
    }

    /// Returns the source the dispatch originated from.
    #[must_use]
    #[inline]
    pub fn original_source(&self) -> Option<K> {
        self.original_source
    }

    /// Sets the source, fixing the original source on first assignment.
    ///
    /// # Panics
    ///
    /// Panics while a user-initiated dispatch is invoking a handler: user
    /// code must not corrupt mid-flight routing state.
    pub fn set_source(&mut self, source: K) {
        self.assert_not_invoking_user_initiated("source");
        self.set_source_routing(source);
    }

    /// Source rewrite for the route machinery itself; bypasses the
    /// user-initiated guard.
    pub(crate) fn set_source_routing(&mut self, source: K) {
        if self.original_source.is_none() {
            self.original_source = Some(source);
        }
        self.source = Some(source);
    }

    pub(crate) fn set_invoking(&mut self, invoking: bool) {
        self.state.set(ArgsState::INVOKING_HANDLER, invoking);
    }

    /// Borrows the payload as `P`.
    #[must_use]
    pub fn payload_ref<P: 'static>(&self) -> Option<&P> {
        self.payload.downcast_ref()
    }

    /// Mutably borrows the payload as `P`.
    #[must_use]
    pub fn payload_mut<P: 'static>(&mut self) -> Option<&mut P> {
        self.payload.downcast_mut()
    }

    fn assert_not_invoking_user_initiated(&self, what: &str) {
        assert!(
            !self
                .state
                .contains(ArgsState::INVOKING_HANDLER | ArgsState::USER_INITIATED),
            "event {what} cannot change while a user-initiated dispatch is invoking handlers"
        );
    }
}

impl<K: Copy + Eq + fmt::Debug> fmt::Debug for EventArgs<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventArgs")
            .field("event", &self.event)
            .field("source", &self.source)
            .field("original_source", &self.original_source)
            .field("handled", &self.handled())
            .field("user_initiated", &self.user_initiated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;

    fn event() -> RoutedEvent<u32> {
        RoutedEvent::from_id(EventId::new(0))
    }

    #[test]
    fn payload_roundtrip() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 5_u32);
        assert_eq!(args.payload_ref::<u32>(), Some(&5));
        *args.payload_mut::<u32>().unwrap() = 9;
        assert_eq!(args.payload_ref::<u32>(), Some(&9));
        assert_eq!(args.payload_ref::<String>(), None);
    }

    #[test]
    fn first_source_assignment_fixes_original() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        assert_eq!(args.source(), None);

        args.set_source(3);
        assert_eq!(args.source(), Some(3));
        assert_eq!(args.original_source(), Some(3));

        args.set_source(8);
        assert_eq!(args.source(), Some(8));
        assert_eq!(args.original_source(), Some(3));
    }

    #[test]
    fn handled_can_be_reset() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        args.set_handled(true);
        assert!(args.handled());
        args.set_handled(false);
        assert!(!args.handled());
    }

    #[test]
    fn source_free_while_not_invoking_even_if_user_initiated() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        args.mark_user_initiated();
        args.set_source(1);
        assert_eq!(args.source(), Some(1));
    }

    #[test]
    #[should_panic(expected = "cannot change while a user-initiated dispatch")]
    fn source_locked_while_invoking_user_initiated() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        args.set_source(1);
        args.mark_user_initiated();
        args.set_invoking(true);
        args.set_source(2);
    }

    #[test]
    fn routing_rewrite_bypasses_the_guard() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        args.set_source(1);
        args.mark_user_initiated();
        args.set_invoking(true);
        args.set_source_routing(2);
        assert_eq!(args.source(), Some(2));
        assert_eq!(args.original_source(), Some(1));
    }

    #[test]
    fn set_event_swaps_identity_for_same_payload_type() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        let other: RoutedEvent<u32> = RoutedEvent::from_id(EventId::new(9));
        args.set_event(other);
        assert_eq!(args.event(), other.id());
    }

    #[test]
    #[should_panic(expected = "share the payload type")]
    fn set_event_rejects_payload_type_change() {
        let mut args: EventArgs<u32> = EventArgs::new(event(), 0_u32);
        let other: RoutedEvent<String> = RoutedEvent::from_id(EventId::new(9));
        args.set_event(other);
    }

    #[test]
    fn erased_payload_queries() {
        let payload = ErasedPayload::new(String::from("hi"));
        assert!(payload.is::<String>());
        assert!(!payload.is::<u32>());
        assert_eq!(payload.type_id(), TypeId::of::<String>());
    }
}
