//! Playback state types and the status snapshot

use serde::Serialize;
use vamp_common::Seconds;

pub use vamp_common::events::PlayerStatus;

/// Repeat mode for a single loaded track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    NoRepeat,
    Once,
    Infinite,
}

impl RepeatMode {
    /// Next mode in the repeat cycle: none -> once -> infinite -> none
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::NoRepeat => RepeatMode::Once,
            RepeatMode::Once => RepeatMode::Infinite,
            RepeatMode::Infinite => RepeatMode::NoRepeat,
        }
    }

    /// User-facing label
    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::NoRepeat => "No Repeat",
            RepeatMode::Once => "Repeat Once",
            RepeatMode::Infinite => "Repeat Infinite",
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Repeat mode for a loaded program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramRepeat {
    NoRepeat,
    All,
    CurrentItem,
}

impl ProgramRepeat {
    /// Next mode in the repeat cycle: none -> all -> current -> none
    pub fn cycled(self) -> Self {
        match self {
            ProgramRepeat::NoRepeat => ProgramRepeat::All,
            ProgramRepeat::All => ProgramRepeat::CurrentItem,
            ProgramRepeat::CurrentItem => ProgramRepeat::NoRepeat,
        }
    }

    /// User-facing label
    pub fn label(self) -> &'static str {
        match self {
            ProgramRepeat::NoRepeat => "No Repeat",
            ProgramRepeat::All => "Repeat All",
            ProgramRepeat::CurrentItem => "Repeat Current Song",
        }
    }
}

impl std::fmt::Display for ProgramRepeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived player status exposed by the `status` command
///
/// Field names follow the external command protocol, hence camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub name: String,
    pub remained_time: Seconds,
    pub repeat: String,
    pub shuffle: bool,
    pub paused: bool,
}

impl StatusSnapshot {
    /// The well-defined snapshot for "nothing loaded"
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            remained_time: 0,
            repeat: RepeatMode::NoRepeat.label().to_string(),
            shuffle: false,
            paused: true,
        }
    }
}
