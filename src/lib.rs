//! Robot face library.
//!
//! This module exposes the face player, its ECS resources, systems and
//! events for use in integration tests and by the binary.

pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
