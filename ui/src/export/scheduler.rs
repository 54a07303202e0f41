//! A scheduler driven by an explicit virtual clock.
//!
//! Timers only fire when [`ManualScheduler::advance`] moves the clock past
//! their deadline. Clones share the same clock, so a test can hand one clone
//! to a coordinator and keep another to drive it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::coordinator::{Scheduler, Timer};

#[derive(Debug, Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    pending: Vec<(u64, Duration, Timer)>,
}

#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    /// Number of timers that are armed and not yet fired.
    pub fn pending(&self) -> usize {
        self.clock.borrow().pending.len()
    }

    /// Move the clock forward and return the timers that came due, earliest first.
    pub fn advance(&self, by: Duration) -> Vec<Timer> {
        let mut clock = self.clock.borrow_mut();
        clock.now += by;
        let now = clock.now;

        let mut due: Vec<(u64, Duration, Timer)> = Vec::new();
        clock.pending.retain(|entry| {
            if entry.1 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(id, deadline, _)| (*deadline, *id));
        due.into_iter().map(|(_, _, timer)| timer).collect()
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u64;

    fn schedule(&mut self, timer: Timer, after: Duration) -> u64 {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let id = clock.next_id;
        let deadline = clock.now + after;
        clock.pending.push((id, deadline, timer));
        id
    }

    fn cancel(&mut self, handle: u64) {
        self.clock.borrow_mut().pending.retain(|(id, _, _)| *id != handle);
    }
}
