//! Event types for the VAMP engine side channel
//!
//! The engine emits one event per observable side effect; collaborators
//! (reporting, monetization) consume them through an injected sink. All
//! timestamps are virtual time, never wall-clock.

use crate::catalog::TrackId;
use crate::time::Seconds;
use serde::{Deserialize, Serialize};

/// Playback state as exposed to collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Idle,
    Playing,
    Paused,
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Idle => write!(f, "idle"),
            PlayerStatus::Playing => write!(f, "playing"),
            PlayerStatus::Paused => write!(f, "paused"),
        }
    }
}

/// VAMP engine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// The cursor left an item: naturally (completed_fully = true) or by
    /// unload/replacement mid-item (completed_fully = false).
    ///
    /// Contract with the reporting collaborator: exactly one event per
    /// item the cursor leaves.
    ListenFinished {
        item_id: TrackId,
        completed_fully: bool,
        at: Seconds,
    },

    /// An ad break started at a natural item boundary
    AdBreak { price: u64, at: Seconds },

    /// Player status changed
    StateChanged {
        old_status: PlayerStatus,
        new_status: PlayerStatus,
        at: Seconds,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_display() {
        assert_eq!(PlayerStatus::Idle.to_string(), "idle");
        assert_eq!(PlayerStatus::Playing.to_string(), "playing");
        assert_eq!(PlayerStatus::Paused.to_string(), "paused");
    }

    #[test]
    fn test_listen_event_serializes_tagged() {
        let event = PlayerEvent::ListenFinished {
            item_id: Uuid::nil(),
            completed_fully: true,
            at: 42,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ListenFinished");
        assert_eq!(json["completed_fully"], true);
        assert_eq!(json["at"], 42);
    }

    #[test]
    fn test_event_round_trip() {
        let event = PlayerEvent::AdBreak { price: 25, at: 100 };
        let json = serde_json::to_string(&event).unwrap();
        let back: PlayerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
