//! Event types and observers used by the face.
//!
//! Submodules:
//! - [`moodchanged`] – the displayed mood switched to another one
//! - [`quit`] – a quit was requested from the keyboard
//! - [`switchdebug`] – toggle the debug overlay on/off
pub mod moodchanged;
pub mod quit;
pub mod switchdebug;
