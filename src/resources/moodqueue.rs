//! Mood request hand-off between the command thread and the render thread.
//!
//! [`MoodQueue`] wraps an unbounded crossbeam channel. Both ends live in the
//! same value so the queue can be cloned into the producer thread while the
//! player keeps its own handle; `push` and `try_pop` never block.
//!
//! Only raw [`MoodRequest`] strings cross the thread boundary. Validation
//! against the library happens on the render thread, when a request is
//! popped.

use std::fmt;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

/// Raw mood name as received from outside, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodRequest(String);

impl MoodRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        MoodRequest(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MoodRequest {
    fn from(raw: &str) -> Self {
        MoodRequest::new(raw)
    }
}

impl From<String> for MoodRequest {
    fn from(raw: String) -> Self {
        MoodRequest(raw)
    }
}

impl fmt::Display for MoodRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unbounded FIFO of [`MoodRequest`]s, safe to use from two threads.
#[derive(Debug, Clone)]
pub struct MoodQueue {
    tx: Sender<MoodRequest>,
    rx: Receiver<MoodRequest>,
}

impl Default for MoodQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MoodQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded::<MoodRequest>();
        Self { tx, rx }
    }

    /// Append to the tail.
    pub fn push(&self, request: impl Into<MoodRequest>) {
        // Both ends are owned by `self`, so the channel cannot be disconnected here.
        let _ = self.tx.send(request.into());
    }

    /// Remove and return the head, if any.
    pub fn try_pop(&self) -> Option<MoodRequest> {
        match self.rx.try_recv() {
            Ok(request) => Some(request),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Number of requests currently waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
