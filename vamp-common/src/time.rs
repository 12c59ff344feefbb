//! Virtual-time utilities
//!
//! All time in VAMP is discretized virtual time: an unsigned count of
//! abstract time units advanced by the global clock. Nothing in the engine
//! ever reads the wall clock.

/// One unit of virtual time
pub type Seconds = u64;

/// Saturating difference between two virtual timestamps
pub fn delta(from: Seconds, to: Seconds) -> Seconds {
    to.saturating_sub(from)
}
