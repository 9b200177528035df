// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag-and-drop effects, key states, and the default source policies.

bitflags::bitflags! {
    /// The operations a drag source allows and a drop target performs,
    /// matching the native DROPEFFECT bit values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DragDropEffects: u32 {
        /// Copy the data to the target.
        const COPY = 1;
        /// Move the data to the target.
        const MOVE = 1 << 1;
        /// Link the target to the data.
        const LINK = 1 << 2;
        /// Scroll feedback is underway in the target.
        const SCROLL = 0x8000_0000;
    }
}

impl DragDropEffects {
    /// Every transfer effect plus scroll feedback.
    pub const ALL: Self = Self::COPY
        .union(Self::MOVE)
        .union(Self::LINK)
        .union(Self::SCROLL);
}

bitflags::bitflags! {
    /// Mouse-button and modifier state during a drag, matching the native
    /// grfKeyState bit values.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DragDropKeyStates: u32 {
        /// The left mouse button.
        const LEFT_MOUSE_BUTTON = 1;
        /// The right mouse button.
        const RIGHT_MOUSE_BUTTON = 1 << 1;
        /// The Shift key.
        const SHIFT_KEY = 1 << 2;
        /// The Control key.
        const CONTROL_KEY = 1 << 3;
        /// The middle mouse button.
        const MIDDLE_MOUSE_BUTTON = 1 << 4;
        /// The Alt key.
        const ALT_KEY = 1 << 5;
    }
}

impl DragDropKeyStates {
    /// Number of mouse buttons currently held.
    #[must_use]
    pub fn mouse_button_count(self) -> u32 {
        (self & (Self::LEFT_MOUSE_BUTTON | Self::RIGHT_MOUSE_BUTTON | Self::MIDDLE_MOUSE_BUTTON))
            .bits()
            .count_ones()
    }
}

/// What the drag loop should do next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DragAction {
    /// Keep dragging.
    Continue,
    /// Complete the drag with a drop.
    Drop,
    /// Abandon the drag.
    Cancel,
}

/// The default query-continue policy: Escape or a second mouse button
/// cancels, releasing every button drops, anything else continues.
#[must_use]
pub fn default_query_continue(
    escape_pressed: bool,
    key_states: DragDropKeyStates,
) -> DragAction {
    let buttons = key_states.mouse_button_count();
    if escape_pressed || buttons >= 2 {
        DragAction::Cancel
    } else if buttons == 0 {
        DragAction::Drop
    } else {
        DragAction::Continue
    }
}

/// The default enter/over effect policy: move when the source allows it,
/// overridden to copy while Control is held.
#[must_use]
pub fn default_drop_effect(
    allowed: DragDropEffects,
    key_states: DragDropKeyStates,
) -> DragDropEffects {
    if key_states.contains(DragDropKeyStates::CONTROL_KEY)
        && allowed.contains(DragDropEffects::COPY)
    {
        DragDropEffects::COPY
    } else if allowed.contains(DragDropEffects::MOVE) {
        DragDropEffects::MOVE
    } else if allowed.contains(DragDropEffects::COPY) {
        DragDropEffects::COPY
    } else if allowed.contains(DragDropEffects::LINK) {
        DragDropEffects::LINK
    } else {
        DragDropEffects::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_bits_match_native_values() {
        assert_eq!(DragDropEffects::COPY.bits(), 1);
        assert_eq!(DragDropEffects::MOVE.bits(), 2);
        assert_eq!(DragDropEffects::LINK.bits(), 4);
        assert_eq!(DragDropEffects::SCROLL.bits(), 0x8000_0000);
        assert_eq!(DragDropEffects::ALL.bits(), 0x8000_0007);
    }

    #[test]
    fn button_counting() {
        let none = DragDropKeyStates::SHIFT_KEY;
        assert_eq!(none.mouse_button_count(), 0);

        let two = DragDropKeyStates::LEFT_MOUSE_BUTTON | DragDropKeyStates::RIGHT_MOUSE_BUTTON;
        assert_eq!(two.mouse_button_count(), 2);
    }

    #[test]
    fn escape_cancels() {
        let action = default_query_continue(true, DragDropKeyStates::LEFT_MOUSE_BUTTON);
        assert_eq!(action, DragAction::Cancel);
    }

    #[test]
    fn second_button_cancels() {
        let keys = DragDropKeyStates::LEFT_MOUSE_BUTTON | DragDropKeyStates::MIDDLE_MOUSE_BUTTON;
        assert_eq!(default_query_continue(false, keys), DragAction::Cancel);
    }

    #[test]
    fn released_buttons_drop() {
        let action = default_query_continue(false, DragDropKeyStates::CONTROL_KEY);
        assert_eq!(action, DragAction::Drop);
    }

    #[test]
    fn held_button_continues() {
        let action = default_query_continue(false, DragDropKeyStates::LEFT_MOUSE_BUTTON);
        assert_eq!(action, DragAction::Continue);
    }

    #[test]
    fn default_effect_prefers_move() {
        let effect = default_drop_effect(DragDropEffects::ALL, DragDropKeyStates::empty());
        assert_eq!(effect, DragDropEffects::MOVE);
    }

    #[test]
    fn control_turns_move_into_copy() {
        let effect = default_drop_effect(DragDropEffects::ALL, DragDropKeyStates::CONTROL_KEY);
        assert_eq!(effect, DragDropEffects::COPY);
    }

    #[test]
    fn effect_falls_back_within_the_allowed_set() {
        let effect = default_drop_effect(DragDropEffects::LINK, DragDropKeyStates::empty());
        assert_eq!(effect, DragDropEffects::LINK);

        let effect = default_drop_effect(DragDropEffects::empty(), DragDropKeyStates::empty());
        assert_eq!(effect, DragDropEffects::empty());
    }
}
