//! Startup errors.
//!
//! Everything in here is fatal: the face never reaches the render loop when
//! one of these is returned. Runtime problems (unknown moods, bad commands)
//! are logged and absorbed where they happen instead.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration or asset problem detected before rendering starts.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("mood directory '{}' not found", .0.display())]
    MoodDirMissing(PathBuf),

    #[error("mood directory '{}' is not readable: {source}", .path.display())]
    MoodDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no valid moods in '{}'", .0.display())]
    NoMoods(PathBuf),

    #[error("failed to decode frame '{}': {reason}", .path.display())]
    FrameDecode { path: PathBuf, reason: String },

    #[error("failed to load config file '{}': {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("cannot listen for mood commands on {addr}: {source}")]
    CommandBind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}
