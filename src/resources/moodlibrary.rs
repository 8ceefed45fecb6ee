//! Mood library resource.
//!
//! Indexes every mood found under the mood directory: one subdirectory per
//! mood, holding the frames of that mood in lexicographic filename order.
//! The library is built once at startup and never mutated afterwards, so it
//! can be shared behind an [`Arc`] without locking.
//!
//! Frames are generic: the binary stores GPU textures, tests and headless
//! tools store decoded [`RgbaImage`]s or plain markers. The [`FrameLoader`]
//! trait decides which files are frames and how they are decoded.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use crate::error::ConfigurationError;

/// File extensions treated as frames by the default [`FrameLoader::accepts`].
pub const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tga", "webp"];

/// Canonical mood identifier.
///
/// Always trimmed and upper-cased, never empty. Construct it once where a raw
/// name enters the system and pass it around from then on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoodId(Arc<str>);

impl MoodId {
    /// Canonicalize a raw name. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(MoodId(Arc::from(trimmed.to_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, non-empty frames of a single mood.
#[derive(Debug)]
pub struct FrameSequence<F> {
    frames: Vec<F>,
}

impl<F> FrameSequence<F> {
    /// Wrap `frames`, or `None` if there are none.
    pub fn new(frames: Vec<F>) -> Option<Self> {
        if frames.is_empty() {
            None
        } else {
            Some(Self { frames })
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Never true; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&F> {
        self.frames.get(index)
    }

    pub fn first(&self) -> &F {
        &self.frames[0]
    }

    pub fn last_index(&self) -> usize {
        self.frames.len() - 1
    }
}

/// Turns image files into frames.
pub trait FrameLoader {
    type Frame;

    /// Whether `path` looks like a frame file. Defaults to an extension check
    /// against [`FRAME_EXTENSIONS`].
    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                FRAME_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Decode one frame.
    fn load_frame(&mut self, path: &Path) -> Result<Self::Frame, String>;
}

/// Headless loader producing decoded RGBA8 images.
#[derive(Debug, Default, Clone, Copy)]
pub struct RgbaLoader;

impl FrameLoader for RgbaLoader {
    type Frame = RgbaImage;

    fn load_frame(&mut self, path: &Path) -> Result<RgbaImage, String> {
        decode_rgba(path)
    }
}

/// Decode any supported image file into RGBA8.
pub fn decode_rgba(path: &Path) -> Result<RgbaImage, String> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| e.to_string())
}

/// Immutable map from [`MoodId`] to its [`FrameSequence`].
#[derive(Debug)]
pub struct MoodLibrary<F> {
    moods: FxHashMap<MoodId, FrameSequence<F>>,
    sorted_ids: Vec<MoodId>,
}

impl<F> MoodLibrary<F> {
    /// Scan `dir` and decode every mood with `loader`.
    ///
    /// Subdirectories without frame files are skipped. Fails when `dir` is
    /// missing or unreadable, when a frame fails to decode, or when no mood
    /// survives the scan.
    pub fn load<L>(dir: impl AsRef<Path>, loader: &mut L) -> Result<Self, ConfigurationError>
    where
        L: FrameLoader<Frame = F>,
    {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ConfigurationError::MoodDirMissing(dir.to_path_buf()));
        }

        let mut moods = FxHashMap::default();
        for mood_dir in sorted_entries(dir)? {
            if !mood_dir.is_dir() {
                continue;
            }
            let Some(id) = mood_dir
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(MoodId::parse)
            else {
                debug!("Skipping mood directory with unusable name: {:?}", mood_dir);
                continue;
            };

            let mut frames = Vec::new();
            for frame_path in sorted_entries(&mood_dir)? {
                if !frame_path.is_file() || !loader.accepts(&frame_path) {
                    continue;
                }
                let frame = loader.load_frame(&frame_path).map_err(|reason| {
                    ConfigurationError::FrameDecode {
                        path: frame_path.clone(),
                        reason,
                    }
                })?;
                frames.push(frame);
            }

            match FrameSequence::new(frames) {
                Some(sequence) => {
                    debug!("Loaded mood {} ({} frames)", id, sequence.len());
                    if moods.insert(id.clone(), sequence).is_some() {
                        warn!("Mood {} defined twice, keeping {:?}", id, mood_dir);
                    }
                }
                None => debug!("Skipping empty mood directory {:?}", mood_dir),
            }
        }

        let library = Self::from_sequences(moods)
            .ok_or_else(|| ConfigurationError::NoMoods(dir.to_path_buf()))?;
        info!(
            "Robot moods found: {:?}",
            library.mood_ids().iter().map(MoodId::as_str).collect::<Vec<_>>()
        );
        Ok(library)
    }

    /// Build a library from already decoded frames. Empty frame lists are
    /// dropped; returns `None` when nothing is left.
    pub fn from_frames<I, S>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, Vec<F>)>,
        S: AsRef<str>,
    {
        let moods = entries
            .into_iter()
            .filter_map(|(name, frames)| {
                let id = MoodId::parse(name.as_ref())?;
                Some((id, FrameSequence::new(frames)?))
            })
            .collect();
        Self::from_sequences(moods)
    }

    fn from_sequences(moods: FxHashMap<MoodId, FrameSequence<F>>) -> Option<Self> {
        if moods.is_empty() {
            return None;
        }
        let mut sorted_ids: Vec<MoodId> = moods.keys().cloned().collect();
        sorted_ids.sort();
        Some(Self { moods, sorted_ids })
    }

    /// Look up a canonical id.
    pub fn get(&self, id: &MoodId) -> Option<&FrameSequence<F>> {
        self.moods.get(id)
    }

    /// Canonicalize `raw` and return the id if the library knows it.
    pub fn resolve(&self, raw: &str) -> Option<MoodId> {
        let id = MoodId::parse(raw)?;
        self.moods.contains_key(&id).then_some(id)
    }

    /// All ids, sorted.
    pub fn mood_ids(&self) -> &[MoodId] {
        &self.sorted_ids
    }

    /// Lexicographically first id. The library is never empty.
    pub fn first_mood(&self) -> &MoodId {
        &self.sorted_ids[0]
    }

    pub fn len(&self) -> usize {
        self.moods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moods.is_empty()
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ConfigurationError> {
    let unreadable = |source| ConfigurationError::MoodDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = fs::read_dir(dir)
        .map_err(unreadable)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(unreadable)?;
    paths.sort();
    Ok(paths)
}
