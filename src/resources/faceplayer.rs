//! Face animation player.
//!
//! [`AnimationPlayer`] owns the playback state of the face: the active mood,
//! the frame index inside that mood and the time of the last frame advance.
//! It lives on the render thread only. Mood changes requested from outside
//! arrive through its [`MoodQueue`] handle and are applied only at the
//! boundary selected by [`BoundaryPolicy`], so a sequence is never cut in the
//! middle of a cycle.
//!
//! # Boundary policies
//!
//! - [`BoundaryPolicy::LoopRestart`]: the queue is checked every time the
//!   frame index wraps back to 0. Without requests the current mood loops
//!   forever.
//! - [`BoundaryPolicy::ChainWithFallback`]: the queue is checked when the
//!   index reaches the last frame. Without requests the face returns to the
//!   default mood.
//!
//! Time is passed in explicitly as a [`Duration`] since an arbitrary origin,
//! which keeps the player independent of any clock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use log::{info, warn};
use raylib::prelude::Rectangle;

use crate::resources::moodlibrary::{FrameSequence, MoodId, MoodLibrary};
use crate::resources::moodqueue::{MoodQueue, MoodRequest};
use crate::resources::surfacesize::{FrameSize, ScaleMode, SurfaceSize};

/// Default delay between two frames.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Where in a playback cycle queued mood requests may take effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BoundaryPolicy {
    /// Check the queue when the sequence wraps to its first frame.
    #[default]
    LoopRestart,
    /// Check the queue on the last frame, fall back to the default mood.
    ChainWithFallback,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{:?}", self),
        }
    }
}

/// Why the active mood changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Direct [`AnimationPlayer::play`] call.
    Play,
    /// Request popped from the queue at a cycle boundary.
    Queue,
    /// No request pending, returned to the default mood.
    Fallback,
}

/// A mood change reported by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodTransition {
    pub from: MoodId,
    pub to: MoodId,
    pub cause: TransitionCause,
}

/// Playback state. Only the player mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    pub mood: MoodId,
    pub frame_index: usize,
    pub last_advance: Duration,
}

/// The frame to present this tick and where it goes on the surface.
#[derive(Debug)]
pub struct FrameTarget<'a, F> {
    pub frame: &'a F,
    /// Whole frame, in frame pixels.
    pub source: Rectangle,
    /// Destination area on the surface, in surface pixels.
    pub dest: Rectangle,
}

/// Mood playback state machine.
pub struct AnimationPlayer<F> {
    library: Arc<MoodLibrary<F>>,
    queue: MoodQueue,
    policy: BoundaryPolicy,
    default_mood: MoodId,
    frame_delay: Duration,
    state: AnimationState,
}

impl<F> AnimationPlayer<F> {
    /// Start playing the default mood at `now`.
    ///
    /// An unknown `default_mood` is replaced by the lexicographically first
    /// mood in the library.
    pub fn new(
        library: Arc<MoodLibrary<F>>,
        queue: MoodQueue,
        default_mood: &str,
        now: Duration,
    ) -> Self {
        let default_mood = match library.resolve(default_mood) {
            Some(id) => id,
            None => {
                let substitute = library.first_mood().clone();
                warn!(
                    "Default mood '{}' not found, using '{}' instead",
                    default_mood.trim(),
                    substitute
                );
                substitute
            }
        };
        Self {
            state: AnimationState {
                mood: default_mood.clone(),
                frame_index: 0,
                last_advance: now,
            },
            library,
            queue,
            policy: BoundaryPolicy::default(),
            default_mood,
            frame_delay: DEFAULT_FRAME_DELAY,
        }
    }

    pub fn with_frame_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }

    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Advance playback to `now`.
    ///
    /// Moves at most one frame per call, once `frame_delay` has elapsed
    /// since the last advance, and runs the queue check when the boundary of
    /// the configured policy is reached. Returns the mood change, if any.
    pub fn update(&mut self, now: Duration) -> Option<MoodTransition> {
        if now.saturating_sub(self.state.last_advance) < self.frame_delay {
            return None;
        }

        let (frame_count, last_index) = {
            let sequence = self.sequence();
            (sequence.len(), sequence.last_index())
        };
        self.state.frame_index = (self.state.frame_index + 1) % frame_count;
        self.state.last_advance = now;

        match self.policy {
            BoundaryPolicy::LoopRestart if self.state.frame_index == 0 => self.check_queue(now),
            BoundaryPolicy::ChainWithFallback if self.state.frame_index == last_index => {
                self.check_queue_or_fallback(now)
            }
            _ => None,
        }
    }

    /// Switch to `name` immediately, restarting it from the first frame.
    ///
    /// Unknown names are logged and leave the state untouched.
    pub fn play(&mut self, name: &str, now: Duration) -> Option<MoodTransition> {
        match self.library.resolve(name) {
            Some(id) => Some(self.apply_mood(id, now, TransitionCause::Play)),
            None => {
                warn!("Mood '{}' not found.", name.trim());
                None
            }
        }
    }

    /// Queue a request through the player's own queue handle.
    pub fn add_to_queue(&self, name: impl Into<MoodRequest>) {
        self.queue.push(name);
    }

    /// Frame at the current index.
    pub fn current_frame(&self) -> &F {
        let sequence = self.sequence();
        sequence
            .get(self.state.frame_index)
            .unwrap_or_else(|| sequence.first())
    }

    pub fn current_mood(&self) -> &MoodId {
        &self.state.mood
    }

    pub fn frame_index(&self) -> usize {
        self.state.frame_index
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn default_mood(&self) -> &MoodId {
        &self.default_mood
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    pub fn library(&self) -> &MoodLibrary<F> {
        &self.library
    }

    /// Requests waiting in the queue.
    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    fn sequence(&self) -> &FrameSequence<F> {
        // `state.mood` only ever holds ids validated against the library.
        match self.library.get(&self.state.mood) {
            Some(sequence) => sequence,
            None => unreachable!("active mood {} missing from library", self.state.mood),
        }
    }

    fn apply_mood(&mut self, id: MoodId, now: Duration, cause: TransitionCause) -> MoodTransition {
        let from = std::mem::replace(&mut self.state.mood, id.clone());
        self.state.frame_index = 0;
        self.state.last_advance = now;
        info!("Mood {} -> {} ({:?})", from, id, cause);
        MoodTransition { from, to: id, cause }
    }

    /// Pop requests until one names a known mood. Unknown names are dropped
    /// with a warning, blank ones silently.
    fn next_valid_mood(&self) -> Option<MoodId> {
        while let Some(request) = self.queue.try_pop() {
            if request.as_str().trim().is_empty() {
                continue;
            }
            match self.library.resolve(request.as_str()) {
                Some(id) => return Some(id),
                None => warn!("Unknown mood '{}' ignored.", request.as_str().trim()),
            }
        }
        None
    }

    fn check_queue(&mut self, now: Duration) -> Option<MoodTransition> {
        let next = self.next_valid_mood()?;
        if next == self.state.mood {
            return None;
        }
        Some(self.apply_mood(next, now, TransitionCause::Queue))
    }

    fn check_queue_or_fallback(&mut self, now: Duration) -> Option<MoodTransition> {
        match self.next_valid_mood() {
            Some(next) if next != self.state.mood => {
                Some(self.apply_mood(next, now, TransitionCause::Queue))
            }
            Some(_) => None,
            None if self.state.mood != self.default_mood => {
                let default_mood = self.default_mood.clone();
                Some(self.apply_mood(default_mood, now, TransitionCause::Fallback))
            }
            None => None,
        }
    }
}

impl<F: FrameSize> AnimationPlayer<F> {
    /// The frame to draw this tick, placed on a surface of `surface` size.
    pub fn render_target(&self, surface: SurfaceSize, mode: ScaleMode) -> FrameTarget<'_, F> {
        let frame = self.current_frame();
        let (frame_w, frame_h) = frame.frame_size();
        FrameTarget {
            frame,
            source: Rectangle {
                x: 0.0,
                y: 0.0,
                width: frame_w as f32,
                height: frame_h as f32,
            },
            dest: surface.dest_rect(frame_w, frame_h, mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// BLANK has 3 frames, HAPPY 5, SAD 2; frames are (mood, index) pairs.
    fn library() -> Arc<MoodLibrary<(&'static str, usize)>> {
        let entries = [("blank", 3), ("happy", 5), ("sad", 2)]
            .into_iter()
            .map(|(name, count)| (name, (0..count).map(|i| (name, i)).collect::<Vec<_>>()));
        Arc::new(MoodLibrary::from_frames(entries).unwrap())
    }

    fn player(policy: BoundaryPolicy) -> (AnimationPlayer<(&'static str, usize)>, MoodQueue) {
        let queue = MoodQueue::new();
        let player = AnimationPlayer::new(library(), queue.clone(), "blank", ms(0))
            .with_frame_delay(DELAY)
            .with_policy(policy);
        (player, queue)
    }

    /// Advance exactly one frame per call.
    fn step(player: &mut AnimationPlayer<(&'static str, usize)>, clock: &mut u64) -> Option<MoodTransition> {
        *clock += 100;
        player.update(ms(*clock))
    }

    #[test]
    fn test_starts_on_default_mood() {
        let (player, _) = player(BoundaryPolicy::LoopRestart);
        assert_eq!(player.current_mood().as_str(), "BLANK");
        assert_eq!(player.frame_index(), 0);
        assert_eq!(*player.current_frame(), ("blank", 0));
    }

    #[test]
    fn test_unknown_default_falls_back_to_first_mood() {
        let player = AnimationPlayer::new(library(), MoodQueue::new(), "nope", ms(0));
        assert_eq!(player.default_mood().as_str(), "BLANK");
        assert_eq!(player.current_mood().as_str(), "BLANK");
    }

    #[test]
    fn test_no_advance_before_delay() {
        let (mut player, _) = player(BoundaryPolicy::LoopRestart);
        for t in [30, 60, 99] {
            assert!(player.update(ms(t)).is_none());
            assert_eq!(player.frame_index(), 0);
        }
        player.update(ms(100));
        assert_eq!(player.frame_index(), 1);
        assert_eq!(player.state().last_advance, ms(100));
    }

    #[test]
    fn test_advance_once_per_delay_and_wraps() {
        let (mut player, _) = player(BoundaryPolicy::LoopRestart);
        let mut seen = Vec::new();
        // 60 ms ticks: an advance every other tick.
        for tick in 1..=12u64 {
            player.update(ms(tick * 60));
            seen.push(player.frame_index());
        }
        assert_eq!(seen, vec![0, 1, 1, 2, 2, 0, 0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn test_play_valid_mood_resets_to_first_frame() {
        let (mut player, _) = player(BoundaryPolicy::LoopRestart);
        player.update(ms(100));
        let transition = player.play("  happy ", ms(150)).unwrap();
        assert_eq!(transition.from.as_str(), "BLANK");
        assert_eq!(transition.to.as_str(), "HAPPY");
        assert_eq!(transition.cause, TransitionCause::Play);
        assert_eq!(player.frame_index(), 0);
        assert_eq!(*player.current_frame(), ("happy", 0));
        assert_eq!(player.state().last_advance, ms(150));
    }

    #[test]
    fn test_play_unknown_mood_keeps_state() {
        let (mut player, _) = player(BoundaryPolicy::LoopRestart);
        player.update(ms(100));
        let before = player.state().clone();
        assert!(player.play("FOO", ms(120)).is_none());
        assert!(player.play("", ms(120)).is_none());
        assert_eq!(player.state(), &before);
    }

    #[test]
    fn test_loop_restart_switches_on_wrap() {
        let (mut player, queue) = player(BoundaryPolicy::LoopRestart);
        queue.push("HAPPY");
        let mut clock = 0;
        assert!(step(&mut player, &mut clock).is_none()); // 1
        assert!(step(&mut player, &mut clock).is_none()); // 2
        assert_eq!(queue.len(), 1);
        let transition = step(&mut player, &mut clock).unwrap(); // wrap
        assert_eq!(transition.to.as_str(), "HAPPY");
        assert_eq!(transition.cause, TransitionCause::Queue);
        assert_eq!(player.frame_index(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_loop_restart_keeps_looping_without_requests() {
        let (mut player, _) = player(BoundaryPolicy::LoopRestart);
        player.play("happy", ms(0));
        let mut clock = 0;
        for _ in 0..20 {
            assert!(step(&mut player, &mut clock).is_none());
            assert_eq!(player.current_mood().as_str(), "HAPPY");
        }
    }

    #[test]
    fn test_chain_with_fallback_switches_on_last_frame() {
        let (mut player, queue) = player(BoundaryPolicy::ChainWithFallback);
        queue.push("happy");
        let mut clock = 0;
        assert!(step(&mut player, &mut clock).is_none()); // 1
        let transition = step(&mut player, &mut clock).unwrap(); // reaches 2
        assert_eq!(transition.to.as_str(), "HAPPY");
        assert_eq!(player.frame_index(), 0);
    }

    #[test]
    fn test_chain_with_fallback_returns_to_default() {
        let (mut player, _) = player(BoundaryPolicy::ChainWithFallback);
        player.play("sad", ms(0));
        let mut clock = 0;
        let transition = step(&mut player, &mut clock).unwrap(); // SAD reaches its last frame
        assert_eq!(transition.to.as_str(), "BLANK");
        assert_eq!(transition.cause, TransitionCause::Fallback);

        // Resting on the default mood produces no further transitions.
        for _ in 0..10 {
            assert!(step(&mut player, &mut clock).is_none());
        }
    }

    #[test]
    fn test_unknown_requests_are_skipped_within_one_check() {
        let (mut player, queue) = player(BoundaryPolicy::LoopRestart);
        queue.push("FOO");
        queue.push("   ");
        queue.push("sad");
        queue.push("happy");
        let mut clock = 0;
        step(&mut player, &mut clock);
        step(&mut player, &mut clock);
        let transition = step(&mut player, &mut clock).unwrap();
        assert_eq!(transition.to.as_str(), "SAD");
        // One valid transition per check: HAPPY waits for the next boundary.
        assert_eq!(queue.len(), 1);

        let transition = step(&mut player, &mut clock)
            .or_else(|| step(&mut player, &mut clock))
            .unwrap();
        assert_eq!(transition.to.as_str(), "HAPPY");
    }

    #[test]
    fn test_only_unknown_requests_leave_mood_unchanged() {
        let (mut player, queue) = player(BoundaryPolicy::LoopRestart);
        queue.push("FOO");
        let mut clock = 0;
        for _ in 0..3 {
            assert!(step(&mut player, &mut clock).is_none());
        }
        assert_eq!(player.current_mood().as_str(), "BLANK");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_request_for_current_mood_is_consumed_without_restart() {
        let (mut player, queue) = player(BoundaryPolicy::LoopRestart);
        queue.push("blank");
        let mut clock = 0;
        for _ in 0..3 {
            assert!(step(&mut player, &mut clock).is_none());
        }
        assert!(queue.is_empty());
        assert_eq!(player.state().last_advance, ms(300));
    }

    #[test]
    fn test_add_to_queue_feeds_the_same_queue() {
        let (mut player, queue) = player(BoundaryPolicy::LoopRestart);
        player.add_to_queue("sad");
        assert_eq!(queue.len(), 1);
        assert_eq!(player.pending_requests(), 1);
        let mut clock = 0;
        let transition = (0..3).find_map(|_| step(&mut player, &mut clock)).unwrap();
        assert_eq!(transition.to.as_str(), "SAD");
    }

    #[test]
    fn test_frame_index_stays_in_range() {
        let (mut player, queue) = player(BoundaryPolicy::ChainWithFallback);
        let mut clock = 0;
        for i in 0..200 {
            if i % 7 == 0 {
                queue.push(["happy", "sad", "blank", "foo"][i % 4]);
            }
            step(&mut player, &mut clock);
            let count = player.library().get(player.current_mood()).unwrap().len();
            assert!(player.frame_index() < count);
        }
    }

    #[test]
    fn test_policy_display_matches_cli_names() {
        assert_eq!(BoundaryPolicy::LoopRestart.to_string(), "loop-restart");
        assert_eq!(
            BoundaryPolicy::ChainWithFallback.to_string(),
            "chain-with-fallback"
        );
    }
}
