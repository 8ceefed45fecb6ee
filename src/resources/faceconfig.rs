//! Face configuration resource.
//!
//! Settings are read once at startup from an INI file, overridden by command
//! line flags in `main`, and never change afterwards. A missing file simply
//! leaves the defaults in place; a present file with bad values is fatal.
//!
//! # Configuration File Format
//!
//! ```ini
//! [moods]
//! path = ./expressions
//! default = BLANK
//! frame_delay_ms = 100
//! policy = loop-restart
//!
//! [window]
//! fullscreen = true
//! width = 1280
//! height = 720
//! target_fps = 60
//! scale = stretch
//!
//! [commands]
//! source = udp
//! bind = 127.0.0.1:7400
//! channel = /robot_face
//! # last | off; left out, it follows the policy
//! dedup = last
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use bevy_ecs::prelude::*;
use clap::ValueEnum;
use configparser::ini::Ini;
use log::info;

use crate::error::ConfigurationError;
use crate::resources::faceplayer::BoundaryPolicy;
use crate::resources::surfacesize::ScaleMode;

/// Default safe values for startup
const DEFAULT_MOOD_DIR: &str = "./expressions";
const DEFAULT_MOOD: &str = "BLANK";
const DEFAULT_FRAME_DELAY_MS: u64 = 100;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_FULLSCREEN: bool = true;
const DEFAULT_BIND: &str = "127.0.0.1:7400";
const DEFAULT_CHANNEL: &str = "/robot_face";
const DEFAULT_CONFIG_PATH: &str = "./face.ini";

/// Where external mood commands come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CommandSourceKind {
    /// UDP datagrams on [`FaceConfig::bind`].
    #[default]
    Udp,
    /// One command per line on standard input.
    Stdin,
    /// No external commands.
    None,
}

/// How the command thread filters repeated commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DedupMode {
    /// Drop a command equal to the last one queued.
    Last,
    /// Queue every non-blank command.
    Off,
}

impl DedupMode {
    /// Mode used when none is configured.
    ///
    /// With chaining the face returns to the default mood on its own, so the
    /// last queued command says nothing about what is on screen.
    pub fn for_policy(policy: BoundaryPolicy) -> Self {
        match policy {
            BoundaryPolicy::LoopRestart => DedupMode::Last,
            BoundaryPolicy::ChainWithFallback => DedupMode::Off,
        }
    }
}

/// Face configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct FaceConfig {
    /// Directory holding one subdirectory per mood.
    pub mood_dir: PathBuf,
    /// Mood shown at startup and, with chaining, when idle.
    pub default_mood: String,
    /// Milliseconds between two frames.
    pub frame_delay_ms: u64,
    /// When queued moods take effect.
    pub policy: BoundaryPolicy,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Window width in pixels when not fullscreen.
    pub window_width: u32,
    /// Window height in pixels when not fullscreen.
    pub window_height: u32,
    /// Render ticks per second.
    pub target_fps: u32,
    /// How frames are scaled to the surface.
    pub scale: ScaleMode,
    /// External command transport.
    pub command_source: CommandSourceKind,
    /// UDP address to listen on.
    pub bind: SocketAddr,
    /// Channel name accepted in `<channel> <mood>` datagrams.
    pub channel: String,
    /// Repeat filtering; `None` follows [`DedupMode::for_policy`].
    pub dedup: Option<DedupMode>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            mood_dir: PathBuf::from(DEFAULT_MOOD_DIR),
            default_mood: DEFAULT_MOOD.to_string(),
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            policy: BoundaryPolicy::default(),
            fullscreen: DEFAULT_FULLSCREEN,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            scale: ScaleMode::default(),
            command_source: CommandSourceKind::default(),
            bind: DEFAULT_BIND
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 7400))),
            channel: DEFAULT_CHANNEL.to_string(),
            dedup: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    /// Repeat filtering actually applied to incoming commands.
    pub fn effective_dedup(&self) -> DedupMode {
        self.dedup.unwrap_or_else(|| DedupMode::for_policy(self.policy))
    }

    /// Load configuration from the INI file.
    ///
    /// A missing file keeps the current values. Missing keys keep their
    /// current values too; present keys with invalid values are an error.
    pub fn load_from_file(&mut self) -> Result<(), ConfigurationError> {
        if !self.config_path.exists() {
            info!(
                "Config file {:?} not found, using defaults",
                self.config_path
            );
            return Ok(());
        }

        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| ConfigurationError::ConfigFile {
                path: self.config_path.clone(),
                reason,
            })?;

        // [moods] section
        if let Some(path) = config.get("moods", "path") {
            self.mood_dir = PathBuf::from(path);
        }
        if let Some(default) = config.get("moods", "default") {
            self.default_mood = default;
        }
        if let Some(delay) = uint(&config, "moods", "frame_delay_ms")? {
            self.frame_delay_ms = delay;
        }
        if let Some(policy) = config.get("moods", "policy") {
            self.policy = parse_enum("moods.policy", &policy)?;
        }

        // [window] section
        if let Some(fullscreen) = boolean(&config, "window", "fullscreen")? {
            self.fullscreen = fullscreen;
        }
        if let Some(width) = uint(&config, "window", "width")? {
            self.window_width = width as u32;
        }
        if let Some(height) = uint(&config, "window", "height")? {
            self.window_height = height as u32;
        }
        if let Some(fps) = uint(&config, "window", "target_fps")? {
            self.target_fps = fps as u32;
        }
        if let Some(scale) = config.get("window", "scale") {
            self.scale = parse_enum("window.scale", &scale)?;
        }

        // [commands] section
        if let Some(source) = config.get("commands", "source") {
            self.command_source = parse_enum("commands.source", &source)?;
        }
        if let Some(bind) = config.get("commands", "bind") {
            self.bind = bind
                .trim()
                .parse()
                .map_err(|_| ConfigurationError::InvalidValue {
                    key: "commands.bind".to_string(),
                    value: bind.clone(),
                })?;
        }
        if let Some(channel) = config.get("commands", "channel") {
            self.channel = channel;
        }
        if let Some(dedup) = config.get("commands", "dedup") {
            self.dedup = Some(parse_enum("commands.dedup", &dedup)?);
        }

        info!("Loaded config from {:?}", self.config_path);
        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigurationError> {
        let mut config = Ini::new();

        // [moods] section
        config.set(
            "moods",
            "path",
            Some(self.mood_dir.to_string_lossy().into_owned()),
        );
        config.set("moods", "default", Some(self.default_mood.clone()));
        config.set(
            "moods",
            "frame_delay_ms",
            Some(self.frame_delay_ms.to_string()),
        );
        config.set("moods", "policy", Some(self.policy.to_string()));

        // [window] section
        config.set("window", "fullscreen", Some(self.fullscreen.to_string()));
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "scale", Some(enum_name(self.scale)));

        // [commands] section
        config.set("commands", "source", Some(enum_name(self.command_source)));
        config.set("commands", "bind", Some(self.bind.to_string()));
        config.set("commands", "channel", Some(self.channel.clone()));
        if let Some(dedup) = self.dedup {
            config.set("commands", "dedup", Some(enum_name(dedup)));
        }

        config
            .write(&self.config_path)
            .map_err(|e| ConfigurationError::ConfigFile {
                path: self.config_path.clone(),
                reason: e.to_string(),
            })?;

        info!("Saved config to {:?}", self.config_path);
        Ok(())
    }

    /// Log the effective settings.
    pub fn log_summary(&self) {
        info!(
            "Face config: moods={:?} default={} delay={}ms policy={} fullscreen={} {}x{} fps={} scale={} source={} bind={} channel={} dedup={}",
            self.mood_dir,
            self.default_mood,
            self.frame_delay_ms,
            self.policy,
            self.fullscreen,
            self.window_width,
            self.window_height,
            self.target_fps,
            enum_name(self.scale),
            enum_name(self.command_source),
            self.bind,
            self.channel,
            enum_name(self.effective_dedup())
        );
    }
}

fn invalid(section: &str, key: &str, value: String) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        key: format!("{}.{}", section, key),
        value,
    }
}

fn uint(config: &Ini, section: &str, key: &str) -> Result<Option<u64>, ConfigurationError> {
    config
        .getuint(section, key)
        .map_err(|_| invalid(section, key, config.get(section, key).unwrap_or_default()))
}

fn boolean(config: &Ini, section: &str, key: &str) -> Result<Option<bool>, ConfigurationError> {
    config
        .getbool(section, key)
        .map_err(|_| invalid(section, key, config.get(section, key).unwrap_or_default()))
}

fn parse_enum<T: ValueEnum>(key: &str, value: &str) -> Result<T, ConfigurationError> {
    T::from_str(value.trim(), true).map_err(|_| ConfigurationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn enum_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let mut config = FaceConfig::with_path(tmp.path().join("face.ini"));
        config.load_from_file().unwrap();
        assert_eq!(config.default_mood, "BLANK");
        assert_eq!(config.frame_delay(), Duration::from_millis(100));
        assert_eq!(config.policy, BoundaryPolicy::LoopRestart);
        assert_eq!(config.command_source, CommandSourceKind::Udp);
        assert_eq!(config.dedup, None);
    }

    #[test]
    fn test_dedup_follows_policy_unless_set() {
        let mut config = FaceConfig::new();
        assert_eq!(config.effective_dedup(), DedupMode::Last);
        config.policy = BoundaryPolicy::ChainWithFallback;
        assert_eq!(config.effective_dedup(), DedupMode::Off);
        config.dedup = Some(DedupMode::Last);
        assert_eq!(config.effective_dedup(), DedupMode::Last);
    }

    #[test]
    fn test_load_dedup_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.ini");
        fs::write(&path, "[moods]\npolicy = loop-restart\n[commands]\ndedup = OFF\n").unwrap();

        let mut config = FaceConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.dedup, Some(DedupMode::Off));
        assert_eq!(config.effective_dedup(), DedupMode::Off);
    }

    #[test]
    fn test_load_overrides_present_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.ini");
        fs::write(
            &path,
            "[moods]\npath = /opt/face\ndefault = happy\nframe_delay_ms = 80\npolicy = chain-with-fallback\n\
             [window]\nfullscreen = false\nscale = fit\n\
             [commands]\nsource = stdin\nbind = 0.0.0.0:9000\n",
        )
        .unwrap();

        let mut config = FaceConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.mood_dir, PathBuf::from("/opt/face"));
        assert_eq!(config.default_mood, "happy");
        assert_eq!(config.frame_delay_ms, 80);
        assert_eq!(config.policy, BoundaryPolicy::ChainWithFallback);
        assert!(!config.fullscreen);
        assert_eq!(config.scale, ScaleMode::Fit);
        assert_eq!(config.command_source, CommandSourceKind::Stdin);
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.channel, "/robot_face");
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.ini");
        fs::write(&path, "[moods]\nframe_delay_ms = soon\n").unwrap();

        let mut config = FaceConfig::with_path(&path);
        let err = config.load_from_file().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref key, .. } if key == "moods.frame_delay_ms"));
    }

    #[test]
    fn test_unknown_policy_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.ini");
        fs::write(&path, "[moods]\npolicy = sometimes\n").unwrap();

        let mut config = FaceConfig::with_path(&path);
        assert!(config.load_from_file().is_err());
    }

    #[test]
    fn test_save_then_load_preserves_settings() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("face.ini");
        let mut saved = FaceConfig::with_path(&path);
        saved.default_mood = "SAD".to_string();
        saved.policy = BoundaryPolicy::ChainWithFallback;
        saved.command_source = CommandSourceKind::None;
        saved.dedup = Some(DedupMode::Off);
        saved.save_to_file().unwrap();

        let mut loaded = FaceConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.default_mood, "SAD");
        assert_eq!(loaded.policy, BoundaryPolicy::ChainWithFallback);
        assert_eq!(loaded.command_source, CommandSourceKind::None);
        assert_eq!(loaded.bind, saved.bind);
        assert_eq!(loaded.dedup, Some(DedupMode::Off));
    }
}
