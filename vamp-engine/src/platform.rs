//! Per-user engine registry driven by one shared virtual clock
//!
//! The platform owns the [`VirtualClock`] and a lazily grown table of
//! [`PlayerEngine`]s, one per user. Engines are registered as clock
//! listeners in creation order, which fixes the tick delivery order for
//! the lifetime of the session.

use crate::clock::{ListenerHandle, VirtualClock};
use crate::hooks::{CatalogHooks, EventSink, SessionPolicy};
use crate::playback::PlayerEngine;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};
use vamp_common::config::EngineConfig;
use vamp_common::Seconds;

/// The simulation shell: one clock, many user engines
pub struct Platform {
    config: EngineConfig,
    clock: VirtualClock,
    catalog: Rc<dyn CatalogHooks>,
    session: Rc<dyn SessionPolicy>,
    events: Rc<dyn EventSink>,
    engines: Vec<(String, Rc<RefCell<PlayerEngine>>)>,
}

impl Platform {
    pub fn new(
        config: EngineConfig,
        catalog: Rc<dyn CatalogHooks>,
        session: Rc<dyn SessionPolicy>,
        events: Rc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            clock: VirtualClock::new(),
            catalog,
            session,
            events,
            engines: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Seconds {
        self.clock.now()
    }

    pub fn user_count(&self) -> usize {
        self.engines.len()
    }

    /// The engine for `user`, created and clock-registered on first use
    pub fn engine(&mut self, user: &str) -> Rc<RefCell<PlayerEngine>> {
        if let Some((_, engine)) = self.engines.iter().find(|(name, _)| name == user) {
            return engine.clone();
        }
        info!(user, "creating player engine");
        let engine = Rc::new(RefCell::new(PlayerEngine::new(
            user,
            self.config.clone(),
            self.clock.now(),
            self.catalog.clone(),
            self.session.clone(),
            self.events.clone(),
        )));
        self.clock.register(engine.clone());
        self.engines.push((user.to_string(), engine.clone()));
        engine
    }

    /// Advance virtual time, delivering the delta to every engine in
    /// registration order. Zero deltas are delivered too.
    pub fn advance(&mut self, delta: Seconds) {
        debug!(delta, now = self.clock.now(), "advancing virtual time");
        self.clock.advance(delta);
    }

    /// Drop a user: unload their playback (settling side effects) and
    /// stop delivering ticks to them
    pub fn remove_user(&mut self, user: &str) {
        let Some(index) = self.engines.iter().position(|(name, _)| name == user) else {
            return;
        };
        let (_, engine) = self.engines.remove(index);
        engine.borrow_mut().unload();
        let handle: ListenerHandle = engine;
        self.clock.unregister(&handle);
        info!(user, "removed player engine");
    }

    pub fn is_online(&self, user: &str) -> bool {
        self.session.is_online(user)
    }
}
