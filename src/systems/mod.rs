//! Face systems.
//!
//! This module groups the ECS systems that advance time, read input, animate
//! the face and draw it, plus the command intake that runs off the main
//! thread.
//!
//! Submodules overview
//! - [`faceanimation`] – advance the face player and announce mood changes
//! - [`input`] – read hardware input and update [`crate::resources::input::InputState`]
//! - [`moodsubscriber`] – receive mood commands and feed the queue
//! - [`render`] – draw the current frame and the debug overlay using Raylib
//! - [`time`] – update elapsed time and delta

pub mod faceanimation;
pub mod input;
pub mod moodsubscriber;
pub mod render;
pub mod time;
