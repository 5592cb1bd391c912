// Copyright 2026 The wlan-auth Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Timeout scheduling for the single-threaded dispatcher loop.
//!
//! The event loop that owns the dispatcher provides a [`Scheduler`]; the
//! dispatcher wraps it in a [`Timer`] that maps scheduler ids back to typed
//! events. When a scheduled deadline fires, the loop calls back into the
//! dispatcher with the [`EventId`], which resolves to the event only if it
//! was not canceled in the meantime.

use std::{collections::HashMap, time::Duration};

/// Identifies one scheduled timeout. Unique per [`Scheduler`] instance.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct EventId(pub u64);

/// Provided by the event loop hosting the dispatcher. All methods are
/// invoked on the loop thread; implementations must not block.
pub trait Scheduler {
    /// Requests a one-shot timeout after `duration`. Returns a unique id
    /// used to cancel the timeout or to resolve it when it fires.
    fn schedule(&mut self, duration: Duration) -> EventId;
    /// Cancels a previously scheduled timeout. Canceling an id that has
    /// already fired is a no-op.
    fn cancel(&mut self, id: EventId);
}

/// A timer to schedule and cancel timeouts and retrieve triggered events.
pub struct Timer<E> {
    events: HashMap<EventId, E>,
    scheduler: Box<dyn Scheduler>,
}

impl<E> Timer<E> {
    pub fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self { events: HashMap::default(), scheduler }
    }

    /// Resolves a fired timeout to its event. Returns `None` if the event
    /// was canceled or already consumed.
    pub fn triggered(&mut self, event_id: &EventId) -> Option<E> {
        self.events.remove(event_id)
    }

    pub fn schedule_after(&mut self, duration: Duration, event: E) -> EventId {
        let event_id = self.scheduler.schedule(duration);
        self.events.insert(event_id, event);
        event_id
    }

    pub fn cancel_event(&mut self, event_id: EventId) {
        self.events.remove(&event_id);
        self.scheduler.cancel(event_id);
    }

    pub fn cancel_all(&mut self) {
        for event_id in self.events.keys() {
            self.scheduler.cancel(*event_id);
        }
        self.events.clear();
    }
}

#[cfg(test)]
pub mod test_utils {
    use {
        super::*,
        std::{cell::RefCell, rc::Rc},
    };

    /// Counts scheduling requests and records cancellations; never fires on
    /// its own. Tests drive timeouts by calling the dispatcher directly.
    #[derive(Default)]
    pub struct FakeScheduler {
        pub state: Rc<RefCell<FakeSchedulerState>>,
    }

    #[derive(Default)]
    pub struct FakeSchedulerState {
        pub next_id: u64,
        pub scheduled: Vec<(EventId, Duration)>,
        pub canceled: Vec<EventId>,
    }

    impl FakeScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn shared_state(&self) -> Rc<RefCell<FakeSchedulerState>> {
            self.state.clone()
        }
    }

    impl Scheduler for FakeScheduler {
        fn schedule(&mut self, duration: Duration) -> EventId {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = EventId(state.next_id);
            state.scheduled.push((id, duration));
            id
        }

        fn cancel(&mut self, id: EventId) {
            self.state.borrow_mut().canceled.push(id);
        }
    }
}
