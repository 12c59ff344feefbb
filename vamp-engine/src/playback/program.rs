//! Program-level playback cursor — the end-of-item state machine
//!
//! Composes the item-level cursor with an ordered sequence: advancing
//! cascades leftover time across item boundaries until the delta is
//! exhausted or the program truly finishes, applying program repeat modes
//! and shuffle redraw on wraparound.
//!
//! States: active (has a current item) -> finished (exhausted, cursor
//! cleared). "Empty" (no program loaded at all) is the engine holding no
//! cursor.

use crate::error::Result;
use crate::playback::item::ItemCursor;
use crate::playback::sequence::ProgramSequence;
use crate::playback::state::{ProgramRepeat, StatusSnapshot};
use std::sync::Arc;
use tracing::debug;
use vamp_common::catalog::{Program, TrackId};
use vamp_common::Seconds;

/// Elapsed time at or above which `prev` restarts the current item instead
/// of moving to the prior position ("double-tap previous").
pub const PREV_RESTART_THRESHOLD: Seconds = 1;

/// What happened during a time-driven advance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceResult {
    /// Items that played to their natural end during this tick, in order
    /// (an item repeating n times appears n times)
    pub completed: Vec<TrackId>,

    /// The program is exhausted; the item cursor has been cleared
    pub finished: bool,
}

/// Mutable progress pointer over an ordered program
#[derive(Debug)]
pub struct ProgramCursor {
    sequence: ProgramSequence,
    position: usize,
    item: Option<ItemCursor>,
    repeat: ProgramRepeat,
}

impl ProgramCursor {
    /// Cursor at the first item of a non-empty program
    ///
    /// # Panics
    /// Panics on an empty program; the engine rejects those before
    /// constructing a cursor.
    pub fn new(program: Arc<Program>) -> Self {
        Self::resume(program, 0, 0)
    }

    /// Cursor restored to a saved point (podcast resume). Position and
    /// elapsed are clamped into range.
    pub fn resume(program: Arc<Program>, position: usize, elapsed: Seconds) -> Self {
        assert!(!program.is_empty(), "cursor over an empty program");
        let sequence = ProgramSequence::new(program);
        let position = position.min(sequence.len() - 1);
        let item = ItemCursor::resumed(sequence.track_at(position).clone(), elapsed);
        Self {
            sequence,
            position,
            item: Some(item),
            repeat: ProgramRepeat::NoRepeat,
        }
    }

    pub fn program(&self) -> &Arc<Program> {
        self.sequence.program()
    }

    /// Effective position index; meaningless once finished
    pub fn position(&self) -> usize {
        self.position
    }

    /// Canonical index of the current position
    pub fn canonical_position(&self) -> usize {
        self.sequence.canonical_index(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.item.is_none()
    }

    pub fn is_shuffled(&self) -> bool {
        self.sequence.is_shuffled()
    }

    pub fn current(&self) -> Option<&ItemCursor> {
        self.item.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut ItemCursor> {
        self.item.as_mut()
    }

    pub fn current_track_id(&self) -> Option<TrackId> {
        self.item.as_ref().map(|i| i.track_id())
    }

    pub fn repeat(&self) -> ProgramRepeat {
        self.repeat
    }

    /// Cycle the program repeat mode and return the new one
    pub fn cycle_repeat(&mut self) -> ProgramRepeat {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    pub fn pause(&mut self) {
        if let Some(item) = &mut self.item {
            item.pause();
        }
    }

    pub fn unpause(&mut self) {
        if let Some(item) = &mut self.item {
            item.resume();
        }
    }

    /// Advance by a time delta, cascading across item boundaries
    ///
    /// The leftover of each item feeds the next one, so a single large
    /// delta can walk through several short items in one call. When repeat
    /// mode is none and the last item ends, the cursor transitions to
    /// finished and any remaining delta is discarded.
    pub fn advance(&mut self, mut delta: Seconds) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        // Detects wraps that consume no time (all-zero-duration programs)
        let mut delta_at_last_wrap: Option<Seconds> = None;

        loop {
            let Some(item) = self.item.as_mut() else {
                result.finished = true;
                break;
            };

            delta = item.advance(delta);
            if !item.is_finished() {
                break;
            }

            result.completed.push(item.track_id());

            // Item-level repeat resolves locally, no position change
            if item.apply_repeat() {
                if delta == 0 || item.track().duration == 0 {
                    break;
                }
                continue;
            }

            let paused = item.is_paused();
            self.position += 1;
            if self.position < self.sequence.len() {
                let mut next = ItemCursor::new(self.sequence.track_at(self.position).clone());
                if paused {
                    next.pause();
                }
                self.item = Some(next);
                continue;
            }

            // End of collection
            match self.repeat {
                ProgramRepeat::NoRepeat => {
                    debug!(program = %self.program().id, "program finished");
                    self.item = None;
                    self.position = 0;
                    result.finished = true;
                    break;
                }
                ProgramRepeat::All => {
                    if delta_at_last_wrap == Some(delta) {
                        // A whole loop absorbed nothing; drop the delta
                        delta = 0;
                    }
                    delta_at_last_wrap = Some(delta);
                    self.sequence.reshuffle();
                    self.position = 0;
                    let mut next = ItemCursor::new(self.sequence.track_at(0).clone());
                    if paused {
                        next.pause();
                    }
                    self.item = Some(next);
                    if delta == 0 {
                        break;
                    }
                }
                ProgramRepeat::CurrentItem => {
                    if delta_at_last_wrap == Some(delta) {
                        delta = 0;
                    }
                    delta_at_last_wrap = Some(delta);
                    self.position = self.sequence.len() - 1;
                    let mut next = ItemCursor::new(self.sequence.track_at(self.position).clone());
                    if paused {
                        next.pause();
                    }
                    self.item = Some(next);
                    if delta == 0 {
                        break;
                    }
                }
            }
        }

        result
    }

    /// Explicit skip to the next position (not time-driven)
    ///
    /// Wraps per the repeat mode; with no repeat, skipping past the last
    /// item finishes the program. Returns true when that happened.
    pub fn next(&mut self) -> bool {
        if self.item.is_none() {
            return true;
        }

        self.position += 1;
        if self.position >= self.sequence.len() {
            match self.repeat {
                ProgramRepeat::NoRepeat => {
                    self.item = None;
                    self.position = 0;
                    return true;
                }
                ProgramRepeat::All => {
                    self.sequence.reshuffle();
                    self.position = 0;
                }
                ProgramRepeat::CurrentItem => {
                    self.position = self.sequence.len() - 1;
                }
            }
        }
        self.item = Some(ItemCursor::new(
            self.sequence.track_at(self.position).clone(),
        ));
        false
    }

    /// Explicit step backwards (not time-driven)
    ///
    /// Restarts the current item when any time has elapsed; only from
    /// elapsed 0 does it move to the previous position. Never goes below
    /// position 0.
    pub fn prev(&mut self) {
        let Some(item) = self.item.as_mut() else {
            return;
        };
        if item.elapsed() >= PREV_RESTART_THRESHOLD {
            item.restart();
            return;
        }
        if self.position > 0 {
            self.position -= 1;
        }
        self.item = Some(ItemCursor::new(
            self.sequence.track_at(self.position).clone(),
        ));
    }

    /// Toggle shuffle, preserving the currently playing item
    ///
    /// The item is pinned by canonical index (not identity, so duplicate
    /// tracks relocate correctly): capture it, swap the permutation, then
    /// move `position` to wherever that index now sits.
    pub fn toggle_shuffle(&mut self, seed: u64) -> Result<bool> {
        let canonical = self.sequence.canonical_index(self.position);
        let enabled = if self.sequence.is_shuffled() {
            self.sequence.disable_shuffle()?;
            false
        } else {
            self.sequence.enable_shuffle(seed)?;
            true
        };
        self.position = self.sequence.position_of_canonical(canonical);
        Ok(enabled)
    }

    /// Status snapshot: current item plus program-level repeat and shuffle
    pub fn snapshot(&self) -> StatusSnapshot {
        match &self.item {
            Some(item) => StatusSnapshot {
                name: item.track().title.clone(),
                remained_time: item.remaining(),
                repeat: self.repeat.label().to_string(),
                shuffle: self.sequence.is_shuffled(),
                paused: item.is_paused(),
            },
            None => StatusSnapshot::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vamp_common::catalog::{ProgramKind, Track};

    fn program(durations: &[Seconds]) -> Arc<Program> {
        let tracks = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| Arc::new(Track::new(format!("t{}", i), "artist", d)))
            .collect();
        Arc::new(Program::new("list", ProgramKind::Playlist, tracks))
    }

    #[test]
    fn test_cascade_through_items() {
        // Durations [2, 3, 1]: tick(4) lands in item 2 with elapsed 2
        let mut cursor = ProgramCursor::new(program(&[2, 3, 1]));
        let result = cursor.advance(4);

        assert_eq!(result.completed.len(), 1);
        assert!(!result.finished);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.current().unwrap().elapsed(), 2);
    }

    #[test]
    fn test_repeat_all_wraps_with_leftover() {
        // Continuation of the cascade: tick(2) finishes items 2 and 3 and
        // wraps to item 1 with nothing left
        let mut cursor = ProgramCursor::new(program(&[2, 3, 1]));
        cursor.cycle_repeat(); // all
        cursor.advance(4);
        let result = cursor.advance(2);

        assert_eq!(result.completed.len(), 2);
        assert!(!result.finished);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.current().unwrap().elapsed(), 0);
    }

    #[test]
    fn test_no_repeat_finishes_and_discards_delta() {
        let mut cursor = ProgramCursor::new(program(&[2, 3, 1]));
        let result = cursor.advance(100);

        assert!(result.finished);
        assert!(cursor.is_finished());
        assert_eq!(result.completed.len(), 3);
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_advance_is_additive() {
        let build = || {
            let mut c = ProgramCursor::new(program(&[2, 3, 1, 4]));
            c.cycle_repeat(); // all
            c
        };
        let mut split = build();
        split.advance(3);
        split.advance(5);

        let mut whole = build();
        whole.advance(8);

        assert_eq!(split.position(), whole.position());
        assert_eq!(
            split.current().unwrap().elapsed(),
            whole.current().unwrap().elapsed()
        );
    }

    #[test]
    fn test_repeat_current_pins_last_item() {
        let mut cursor = ProgramCursor::new(program(&[2, 3]));
        cursor.cycle_repeat();
        cursor.cycle_repeat(); // current
        let result = cursor.advance(9); // 2 + 3 + 3, then 1 into the replay

        assert!(!result.finished);
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.current().unwrap().elapsed(), 1);
        assert_eq!(result.completed.len(), 3);
    }

    #[test]
    fn test_zero_duration_wrap_does_not_spin() {
        let mut cursor = ProgramCursor::new(program(&[0, 0]));
        cursor.cycle_repeat(); // all
        let result = cursor.advance(50);

        assert!(!result.finished);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_next_advances_and_finishes_at_end() {
        let mut cursor = ProgramCursor::new(program(&[2, 3, 1]));
        assert!(!cursor.next());
        assert_eq!(cursor.position(), 1);
        assert!(!cursor.next());
        assert_eq!(cursor.position(), 2);
        assert!(cursor.next());
        assert!(cursor.is_finished());
    }

    #[test]
    fn test_next_wraps_on_repeat_all() {
        let mut cursor = ProgramCursor::new(program(&[2, 3]));
        cursor.cycle_repeat(); // all
        cursor.next();
        assert!(!cursor.next());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_prev_restarts_then_moves() {
        let mut cursor = ProgramCursor::new(program(&[2, 3, 1]));
        cursor.next();
        cursor.advance(2);

        // Elapsed 2 on item 2: restart it
        cursor.prev();
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.current().unwrap().elapsed(), 0);

        // Elapsed 0: move back to item 1
        cursor.prev();
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.current().unwrap().elapsed(), 0);

        // Position 0, elapsed 0: stays put
        cursor.prev();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_shuffle_toggle_preserves_current_item() {
        let mut cursor = ProgramCursor::new(program(&[2, 3, 1, 4, 5]));
        cursor.next();
        let playing = cursor.current_track_id().unwrap();

        cursor.toggle_shuffle(1234).unwrap();
        assert!(cursor.is_shuffled());
        assert_eq!(cursor.current_track_id().unwrap(), playing);
        assert_eq!(cursor.canonical_position(), 1);

        cursor.toggle_shuffle(0).unwrap();
        assert!(!cursor.is_shuffled());
        assert_eq!(cursor.current_track_id().unwrap(), playing);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_shuffled_advance_follows_permutation() {
        let shared = program(&[2, 2, 2, 2, 2, 2]);

        // Twin sequence with the same seed predicts the effective order
        let mut twin = ProgramSequence::new(shared.clone());
        twin.enable_shuffle(42).unwrap();
        let order = twin.effective_order();
        let start = order.iter().position(|&c| c == 0).unwrap();

        let mut cursor = ProgramCursor::new(shared);
        cursor.toggle_shuffle(42).unwrap();

        // Still on canonical item 0, relocated to its shuffled slot
        assert_eq!(cursor.canonical_position(), 0);
        assert_eq!(cursor.position(), start);

        if start + 1 < order.len() {
            cursor.advance(2);
            assert_eq!(cursor.position(), start + 1);
            assert_eq!(cursor.canonical_position(), order[start + 1]);
        }
    }

    #[test]
    fn test_resume_restores_saved_point() {
        let cursor = ProgramCursor::resume(program(&[10, 20, 30]), 2, 12);
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.current().unwrap().elapsed(), 12);
    }

    #[test]
    fn test_snapshot_reports_program_repeat_label() {
        let mut cursor = ProgramCursor::new(program(&[5, 5]));
        cursor.cycle_repeat();
        let snapshot = cursor.snapshot();
        assert_eq!(snapshot.repeat, "Repeat All");
        assert_eq!(snapshot.name, "t0");
        assert!(!snapshot.shuffle);
    }
}
