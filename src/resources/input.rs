//! Per-tick keyboard input resource.
//!
//! The face only reacts to a couple of keys: Escape quits and F1 toggles the
//! debug overlay.
use bevy_ecs::prelude::*;
use raylib::prelude::*;

#[derive(Debug, Clone, Copy)]
/// Boolean key state with an associated keyboard binding.
pub struct BoolState {
    /// Whether the key was just pressed this tick.
    pub just_pressed: bool,

    /// The key bound to this action.
    pub key_binding: KeyboardKey,
}

impl BoolState {
    pub fn bound_to(key_binding: KeyboardKey) -> Self {
        Self {
            just_pressed: false,
            key_binding,
        }
    }
}

impl Default for BoolState {
    fn default() -> Self {
        Self::bound_to(KeyboardKey::KEY_NULL)
    }
}

/// Resource capturing the keys the face cares about.
#[derive(Resource, Debug, Clone)]
pub struct InputState {
    pub quit: BoolState,
    pub debug_toggle: BoolState,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            quit: BoolState::bound_to(KeyboardKey::KEY_ESCAPE),
            debug_toggle: BoolState::bound_to(KeyboardKey::KEY_F1),
        }
    }
}
