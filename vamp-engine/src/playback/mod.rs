//! Playback machinery
//!
//! Layered bottom-up: [`state`] holds shared vocabulary types, [`item`]
//! tracks position within one track, [`sequence`] owns play order and the
//! shuffle overlay, [`program`] composes the two into a cursor over a whole
//! program, [`progress`] remembers podcast positions across unloads, and
//! [`engine`] is the command-facing orchestrator built on all of them.

pub mod engine;
pub mod item;
pub mod program;
pub mod progress;
pub mod sequence;
pub mod state;

pub use engine::{AdOutcome, PlayerEngine, Selected};
pub use state::{PlayerStatus, ProgramRepeat, RepeatMode, StatusSnapshot};
