//! Face animation system.
//!
//! [`animate_face`] drives the [`AnimationPlayer`] with the render clock once
//! per tick. The player decides on its own whether a frame advances and
//! whether a queued mood takes effect; this system only forwards the time and
//! turns reported transitions into [`MoodChangedEvent`]s.
//!
//! The player is a non-send resource because, in the binary, its frames are
//! GPU textures owned by the render thread.

use bevy_ecs::prelude::*;

use crate::events::moodchanged::MoodChangedEvent;
use crate::resources::faceplayer::AnimationPlayer;
use crate::resources::worldtime::WorldTime;

/// Advance the face player to the current [`WorldTime`].
pub fn animate_face<F: 'static>(
    mut player: NonSendMut<AnimationPlayer<F>>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    if let Some(transition) = player.update(time.elapsed) {
        commands.trigger(MoodChangedEvent::from(transition));
    }
}
