//! Input systems.
//!
//! - [`update_input_state`] reads the keyboard from Raylib each tick and
//!   writes the results into [`InputState`].
//! - [`dispatch_input_events`] turns fresh key presses into events: Escape
//!   triggers [`QuitRequestedEvent`], F1 triggers [`SwitchDebugEvent`].
use bevy_ecs::prelude::*;

use crate::events::quit::QuitRequestedEvent;
use crate::events::switchdebug::SwitchDebugEvent;
use crate::resources::input::InputState;

/// Poll Raylib for keyboard input and update the `InputState` resource.
pub fn update_input_state(mut input: ResMut<InputState>, rl: NonSend<raylib::RaylibHandle>) {
    let input = &mut *input;
    for state in [&mut input.quit, &mut input.debug_toggle] {
        state.just_pressed = rl.is_key_pressed(state.key_binding);
    }
}

/// Emit events for actions that were just pressed.
pub fn dispatch_input_events(input: Res<InputState>, mut commands: Commands) {
    if input.quit.just_pressed {
        commands.trigger(QuitRequestedEvent {});
    }
    if input.debug_toggle.just_pressed {
        commands.trigger(SwitchDebugEvent {});
    }
}
