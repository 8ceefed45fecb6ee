//! Render clock resource.
//!
//! Accumulates frame deltas into a monotonic elapsed [`Duration`] that the
//! face player uses as its notion of "now".

use std::time::Duration;

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Time since startup.
    pub elapsed: Duration,
    /// Delta of the last tick, in seconds.
    pub delta: f32,
    /// Ticks run so far.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: Duration::ZERO,
            delta: 0.0,
            frame_count: 0,
        }
    }
}
