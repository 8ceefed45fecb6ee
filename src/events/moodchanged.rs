//! Mood change notification.
//!
//! [`animate_face`](crate::systems::faceanimation::animate_face) triggers a
//! [`MoodChangedEvent`] whenever the player switches moods. The default
//! observer records the latest change in [`LastMoodChange`] so the debug
//! overlay can show it.
use crate::resources::faceplayer::{MoodTransition, TransitionCause};
use crate::resources::moodlibrary::MoodId;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::debug;

/// The face switched from one mood to another.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct MoodChangedEvent {
    pub from: MoodId,
    pub to: MoodId,
    pub cause: TransitionCause,
}

impl From<MoodTransition> for MoodChangedEvent {
    fn from(transition: MoodTransition) -> Self {
        Self {
            from: transition.from,
            to: transition.to,
            cause: transition.cause,
        }
    }
}

/// Most recent mood change, if any happened yet.
#[derive(Resource, Debug, Clone, Default)]
pub struct LastMoodChange(pub Option<MoodChangedEvent>);

pub fn mood_changed_observer(trigger: On<MoodChangedEvent>, mut last: ResMut<LastMoodChange>) {
    let event = trigger.event();
    debug!("MoodChangedEvent {} -> {}", event.from, event.to);
    last.0 = Some(event.clone());
}
