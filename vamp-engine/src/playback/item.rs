//! Item-level playback cursor
//!
//! Tracks elapsed time inside one track. `advance` consumes as much of a
//! delta as the track can absorb and returns the remainder, which is what
//! lets a program cursor cascade one large delta across several short
//! items in a single tick.

use crate::playback::state::{RepeatMode, StatusSnapshot};
use std::sync::Arc;
use vamp_common::catalog::{Track, TrackId};
use vamp_common::Seconds;

/// Mutable progress pointer over a single track
#[derive(Debug, Clone)]
pub struct ItemCursor {
    track: Arc<Track>,
    elapsed: Seconds,
    paused: bool,
    repeat: RepeatMode,
}

impl ItemCursor {
    /// Fresh cursor at the start of a track, playing, no repeat
    pub fn new(track: Arc<Track>) -> Self {
        Self {
            track,
            elapsed: 0,
            paused: false,
            repeat: RepeatMode::NoRepeat,
        }
    }

    /// Cursor resumed mid-track (saved podcast progress); elapsed is
    /// clamped to the track duration.
    pub fn resumed(track: Arc<Track>, elapsed: Seconds) -> Self {
        let elapsed = elapsed.min(track.duration);
        Self {
            track,
            elapsed,
            paused: false,
            repeat: RepeatMode::NoRepeat,
        }
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    pub fn track_id(&self) -> TrackId {
        self.track.id
    }

    pub fn elapsed(&self) -> Seconds {
        self.elapsed
    }

    /// Remaining play time
    pub fn remaining(&self) -> Seconds {
        self.track.remaining_time(self.elapsed)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed == self.track.duration
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Cycle the repeat mode and return the new one
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    /// Consume up to `delta` of elapsed time, returning the unconsumed
    /// remainder. A finished cursor consumes nothing.
    ///
    /// The pause gate lives in the engine, not here: consuming is
    /// unconditional so `advance(d1); advance(d2)` always equals
    /// `advance(d1 + d2)`.
    pub fn advance(&mut self, delta: Seconds) -> Seconds {
        let consumed = delta.min(self.remaining());
        self.elapsed += consumed;
        delta - consumed
    }

    /// Resolve a pending repeat at end of track
    ///
    /// Returns true if playback continues on this track (elapsed reset).
    /// `Once` is consumed by the reset; `Infinite` persists; `NoRepeat`
    /// leaves the cursor finished.
    pub fn apply_repeat(&mut self) -> bool {
        if !self.is_finished() {
            return false;
        }
        match self.repeat {
            RepeatMode::NoRepeat => false,
            RepeatMode::Once => {
                self.elapsed = 0;
                self.repeat = RepeatMode::NoRepeat;
                true
            }
            RepeatMode::Infinite => {
                self.elapsed = 0;
                true
            }
        }
    }

    /// Jump back to the start of the track
    pub fn restart(&mut self) {
        self.elapsed = 0;
    }

    /// Seek toward the end, clamped at the track duration
    pub fn seek_forward(&mut self, amount: Seconds) {
        self.elapsed = (self.elapsed + amount).min(self.track.duration);
    }

    /// Seek toward the start, clamped at 0
    pub fn seek_backward(&mut self, amount: Seconds) {
        self.elapsed = self.elapsed.saturating_sub(amount);
    }

    /// Status snapshot for a single loaded track (shuffle never applies)
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            name: self.track.title.clone(),
            remained_time: self.remaining(),
            repeat: self.repeat.label().to_string(),
            shuffle: false,
            paused: self.paused,
        }
    }
}
