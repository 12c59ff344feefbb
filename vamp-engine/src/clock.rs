//! Global virtual clock
//!
//! Process-wide monotonically increasing virtual time. Each `advance`
//! computes nothing asynchronously: the delta is delivered to every
//! registered listener synchronously, in registration order, before the
//! call returns. That ordering is externally observable (two users'
//! end-of-track side effects happen in a fixed sequence) and must hold for
//! every tick, including zero-delta ticks.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;
use vamp_common::Seconds;

/// Receiver of virtual time deltas
pub trait TickListener {
    /// Called once per clock advance with the elapsed delta (may be 0)
    fn on_tick(&mut self, delta: Seconds);
}

/// Shared handle to a tick listener
pub type ListenerHandle = Rc<RefCell<dyn TickListener>>;

/// The global virtual clock
pub struct VirtualClock {
    now: Seconds,
    listeners: Vec<ListenerHandle>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            now: 0,
            listeners: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Seconds {
        self.now
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Register a listener, appending it to the broadcast order
    ///
    /// Idempotent: registering the same handle twice keeps its original
    /// position and does not duplicate deliveries.
    pub fn register(&mut self, listener: ListenerHandle) {
        if self.listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return;
        }
        self.listeners.push(listener);
    }

    /// Remove a listener from the broadcast order
    pub fn unregister(&mut self, listener: &ListenerHandle) {
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
    }

    /// Advance virtual time and broadcast the delta
    ///
    /// Delivery is synchronous and in registration order. A delta of 0 is
    /// a legal no-op tick that is still delivered (commands that carry no
    /// elapsed time).
    pub fn advance(&mut self, delta: Seconds) {
        self.now += delta;
        trace!(delta, now = self.now, "clock advance");
        for listener in &self.listeners {
            listener.borrow_mut().on_tick(delta);
        }
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        tag: u32,
        log: Rc<RefCell<Vec<(u32, Seconds)>>>,
    }

    impl TickListener for Recorder {
        fn on_tick(&mut self, delta: Seconds) {
            self.log.borrow_mut().push((self.tag, delta));
        }
    }

    fn recorder(tag: u32, log: &Rc<RefCell<Vec<(u32, Seconds)>>>) -> ListenerHandle {
        Rc::new(RefCell::new(Recorder {
            tag,
            log: log.clone(),
        }))
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = VirtualClock::new();
        assert_eq!(clock.now(), 0);
        clock.advance(5);
        clock.advance(7);
        assert_eq!(clock.now(), 12);
    }

    #[test]
    fn test_broadcast_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut clock = VirtualClock::new();
        clock.register(recorder(1, &log));
        clock.register(recorder(2, &log));
        clock.register(recorder(3, &log));

        clock.advance(4);

        assert_eq!(&*log.borrow(), &[(1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn test_zero_delta_still_delivered() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut clock = VirtualClock::new();
        clock.register(recorder(1, &log));

        clock.advance(0);

        assert_eq!(&*log.borrow(), &[(1, 0)]);
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_register_is_idempotent() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut clock = VirtualClock::new();
        let first = recorder(1, &log);
        clock.register(first.clone());
        clock.register(recorder(2, &log));
        clock.register(first.clone());

        assert_eq!(clock.listener_count(), 2);
        clock.advance(1);
        // First listener kept its original position, single delivery
        assert_eq!(&*log.borrow(), &[(1, 1), (2, 1)]);
    }

    #[test]
    fn test_unregister_removes_from_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut clock = VirtualClock::new();
        let first = recorder(1, &log);
        clock.register(first.clone());
        clock.register(recorder(2, &log));

        clock.unregister(&first);
        clock.advance(2);

        assert_eq!(&*log.borrow(), &[(2, 2)]);
    }
}
