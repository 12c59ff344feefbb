//! Collaborator capability traits
//!
//! The engine never owns catalog entities, session records, or the
//! reporting pipeline. It reaches each collaborator through a narrow
//! capability trait injected at construction, so tests (and the external
//! platform shell) can supply in-memory implementations.

use std::cell::RefCell;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;
use vamp_common::events::PlayerEvent;

/// Loaded-count bookkeeping on catalog entities
///
/// The engine is the sole mutator of the counters for content it currently
/// holds as loaded; external deletion-safety checks read them. Counts must
/// never go negative.
pub trait CatalogHooks {
    /// Entity became actively loaded by a player
    fn increment_loaded(&self, id: Uuid);

    /// Entity stopped being actively loaded
    fn decrement_loaded(&self, id: Uuid);
}

/// Session facts the engine needs but does not own
pub trait SessionPolicy {
    /// Offline users receive no playback progression
    fn is_online(&self, user: &str) -> bool;

    /// Premium users never accrue ad markers
    fn is_premium(&self, user: &str) -> bool;
}

/// Side channel for engine events (listen reporting, ads, state changes)
pub trait EventSink {
    fn publish(&self, event: PlayerEvent);
}

/// In-memory loaded-count table
///
/// Reference implementation of [`CatalogHooks`] used by tests and by
/// consumers without a real catalog service.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    counts: RefCell<HashMap<Uuid, u64>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current loaded count for an entity (0 if never loaded)
    pub fn loaded_count(&self, id: Uuid) -> u64 {
        self.counts.borrow().get(&id).copied().unwrap_or(0)
    }
}

impl CatalogHooks for InMemoryCatalog {
    fn increment_loaded(&self, id: Uuid) {
        *self.counts.borrow_mut().entry(id).or_insert(0) += 1;
    }

    fn decrement_loaded(&self, id: Uuid) {
        let mut counts = self.counts.borrow_mut();
        match counts.get_mut(&id) {
            Some(count) if *count > 0 => *count -= 1,
            _ => warn!(%id, "decrement of a loaded count that is already 0"),
        }
    }
}

/// Session policy with every user online and nobody premium
#[derive(Debug, Default)]
pub struct OpenSessions;

impl SessionPolicy for OpenSessions {
    fn is_online(&self, _user: &str) -> bool {
        true
    }

    fn is_premium(&self, _user: &str) -> bool {
        false
    }
}

/// Event sink that retains everything published, in order
#[derive(Debug, Default)]
pub struct CollectedEvents {
    events: RefCell<Vec<PlayerEvent>>,
}

impl CollectedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all collected events
    pub fn take(&self) -> Vec<PlayerEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for CollectedEvents {
    fn publish(&self, event: PlayerEvent) {
        self.events.borrow_mut().push(event);
    }
}
