//! Quit request event and observer.
//!
//! Triggered by the Escape key. The observer raises the [`ShutdownFlag`],
//! the same flag the signal handler raises, and the main loop exits after the
//! current tick.
use crate::resources::shutdown::ShutdownFlag;
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::info;

#[derive(Event, Debug, Clone, Copy)]
pub struct QuitRequestedEvent {}

pub fn quit_requested_observer(_trigger: On<QuitRequestedEvent>, flag: Res<ShutdownFlag>) {
    info!("Quit requested");
    flag.raise();
}
