//! # VAMP Playback Engine (vamp-engine)
//!
//! Playback & time-progression engine for the VAMP virtual-time media
//! platform.
//!
//! **Purpose:** Own per-user play/pause/seek state, advance playback
//! position through single tracks and ordered programs as virtual time
//! passes, apply shuffle/repeat policies, and trigger end-of-item and
//! end-of-collection transitions with their side effects (ad insertion,
//! listen reporting, loaded-count accounting).
//!
//! **Architecture:** Single-threaded and synchronous. A global
//! [`clock::VirtualClock`] broadcasts each time delta to every registered
//! [`playback::PlayerEngine`] in registration order before the triggering
//! command itself is applied. Catalog, session, and reporting collaborators
//! are reached through the capability traits in [`hooks`].

pub mod clock;
pub mod error;
pub mod hooks;
pub mod platform;
pub mod playback;

pub use error::{PlayerError, Result};
pub use platform::Platform;
