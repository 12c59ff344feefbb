//! Catalog entity models
//!
//! Tracks and programs are owned by the external catalog collaborator; the
//! playback engine only observes them (duration, order, identity). The
//! engine never creates or deletes catalog entities, and the loaded-count
//! bookkeeping that gates deletion safety lives behind the engine's
//! `CatalogHooks` capability, not on these structs.

use crate::time::Seconds;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Track identity
pub type TrackId = Uuid;

/// Program identity
pub type ProgramId = Uuid;

/// A single playable unit with a fixed duration (track or episode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track UUID
    pub id: TrackId,

    /// Display name
    pub title: String,

    /// Owning artist/host name (read-only to the engine, used by
    /// revenue/like accounting elsewhere)
    pub owner: String,

    /// Fixed duration in virtual time units
    pub duration: Seconds,
}

impl Track {
    /// Create a track with a fresh identity
    pub fn new(title: impl Into<String>, owner: impl Into<String>, duration: Seconds) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            owner: owner.into(),
            duration,
        }
    }

    /// Remaining play time given elapsed time, floored at 0
    pub fn remaining_time(&self, elapsed: Seconds) -> Seconds {
        self.duration.saturating_sub(elapsed)
    }
}

/// What kind of ordered collection a program is
///
/// Podcasts keep per-user resume progress across loads; albums and
/// playlists always restart from the first item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramKind {
    Album,
    Playlist,
    Podcast,
}

/// An ordered collection of tracks (album/playlist/podcast)
///
/// Insertion order is the canonical order. Shuffle is an engine-side
/// overlay; this struct is never reordered in place.
#[derive(Debug, Clone)]
pub struct Program {
    /// Program UUID
    pub id: ProgramId,

    /// Display name
    pub title: String,

    /// Collection kind
    pub kind: ProgramKind,

    /// Tracks in canonical order
    pub tracks: Vec<Arc<Track>>,
}

impl Program {
    /// Create a program with a fresh identity
    pub fn new(title: impl Into<String>, kind: ProgramKind, tracks: Vec<Arc<Track>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            tracks,
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// True if the program holds no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at a canonical index
    pub fn track_at(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }
}
