//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: the mood library and player, the
//! command queue, timing, input state and configuration. Each submodule
//! documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `debugmode` – presence toggles the debug overlay
//! - `faceconfig` – settings loaded from `face.ini` and the command line
//! - `faceplayer` – mood state machine choosing the frame to show
//! - `input` – per-frame keyboard state of keys relevant to the face
//! - `moodlibrary` – decoded frame sequences keyed by mood name
//! - `moodqueue` – thread-safe FIFO of pending mood requests
//! - `moodsubscriber` – handle to the external command thread
//! - `shutdown` – flag raised by signals or the quit key
//! - `surfacesize` – current framebuffer dimensions and frame scaling
//! - `textureloader` – uploads decoded frames as GPU textures
//! - `worldtime` – elapsed time and delta
pub mod debugmode;
pub mod faceconfig;
pub mod faceplayer;
pub mod input;
pub mod moodlibrary;
pub mod moodqueue;
pub mod moodsubscriber;
pub mod shutdown;
pub mod surfacesize;
pub mod textureloader;
pub mod worldtime;
