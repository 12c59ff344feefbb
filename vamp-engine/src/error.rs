//! Error types for vamp-engine
//!
//! Every engine operation failure is a local, recoverable outcome: the
//! offending call is rejected, state is left exactly as it was, and the
//! `Display` rendering is the user-facing message the command loop prints.

use thiserror::Error;

/// Convenience Result type using the engine PlayerError
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Recoverable failures of player engine operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerError {
    /// Load without a prior selection
    #[error("Please select a source before attempting to load.")]
    NothingSelected,

    /// Load of a zero-length program
    #[error("You can't load an empty audio collection!")]
    EmptyCollection,

    /// next/prev/shuffle on a single track
    #[error("The loaded source is not a collection.")]
    NotACollection,

    /// Operation that needs a loaded source while idle
    #[error("Please load a source before using this command.")]
    NothingLoaded,

    /// Shuffle toggled into the state it is already in, or shuffle on a
    /// program too short to reorder
    #[error("Shuffle is not applicable in the current state.")]
    InvalidShuffleState,

    /// Seek or repeat-cycle with no eligible target
    #[error("Repeat and seek require a loaded source.")]
    InvalidRepeatTarget,

    /// Ad marker armed while no single track is playing
    #[error("Ad breaks can only be inserted while a track is playing.")]
    NoAdTarget,
}
