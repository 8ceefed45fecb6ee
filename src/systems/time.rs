//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per tick from the raylib frame time.
use std::time::Duration;

use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta on the `WorldTime` resource.
///
/// `dt` is the frame delta in seconds. Negative or non-finite deltas are
/// treated as zero so the clock never runs backwards.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.resource_mut::<WorldTime>();
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    wt.elapsed += Duration::from_secs_f32(dt);
    wt.delta = dt;
    wt.frame_count += 1;
}
