//! Saved listening progress for resumable programs
//!
//! Podcasts resume where the user left them: unloading (or replacing) a
//! podcast saves the canonical position and elapsed time, the next load of
//! the same program restores them, and finishing the program clears the
//! entry. Albums and playlists never touch this store.

use std::collections::HashMap;
use vamp_common::catalog::ProgramId;
use vamp_common::Seconds;

/// A saved point inside a program, in canonical order terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedProgress {
    pub position: usize,
    pub elapsed: Seconds,
}

/// Per-user progress store, keyed by program identity
#[derive(Debug, Default)]
pub struct ProgressStore {
    saved: HashMap<ProgramId, SavedProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, program: ProgramId, position: usize, elapsed: Seconds) {
        self.saved
            .insert(program, SavedProgress { position, elapsed });
    }

    pub fn get(&self, program: ProgramId) -> Option<SavedProgress> {
        self.saved.get(&program).copied()
    }

    pub fn clear(&mut self, program: ProgramId) {
        self.saved.remove(&program);
    }
}
