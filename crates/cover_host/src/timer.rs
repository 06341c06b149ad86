//! Timer service contracts, a deterministic manual adapter, and scoped (owned) timer sets.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Identifier handed out by a [`TimerService`] for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Callback invoked when a timer fires.
pub type TimerCallback = Rc<dyn Fn()>;

/// Host event-loop timers.
///
/// Callbacks run on the host event loop, never re-entrantly inside another service call.
pub trait TimerService {
    /// Schedules `callback` to run once after `delay`.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Schedules `callback` to run every `period` until cleared.
    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId;

    /// Cancels a timer. Unknown or already-fired ids are ignored.
    fn clear(&self, id: TimerId);
}

#[derive(Debug, Default)]
/// Timer service that accepts registrations and never fires them.
pub struct NoopTimerService {
    next_id: Cell<u64>,
}

impl NoopTimerService {
    fn allocate(&self) -> TimerId {
        let id = self.next_id.get().saturating_add(1);
        self.next_id.set(id);
        TimerId(id)
    }
}

impl TimerService for NoopTimerService {
    fn set_timeout(&self, _delay: Duration, _callback: TimerCallback) -> TimerId {
        self.allocate()
    }

    fn set_interval(&self, _period: Duration, _callback: TimerCallback) -> TimerId {
        self.allocate()
    }

    fn clear(&self, _id: TimerId) {}
}

struct ManualTimer {
    due_ms: u64,
    period_ms: Option<u64>,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualTimerState {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, ManualTimer>,
}

impl ManualTimerState {
    fn insert(&mut self, delay: Duration, period: Option<Duration>, callback: TimerCallback) -> TimerId {
        self.next_id = self.next_id.saturating_add(1);
        let id = TimerId(self.next_id);
        let delay_ms = duration_ms(delay);
        self.timers.insert(
            id,
            ManualTimer {
                due_ms: self.now_ms.saturating_add(delay_ms),
                // Zero-period intervals would never let `advance` finish.
                period_ms: period.map(|p| duration_ms(p).max(1)),
                callback,
            },
        );
        id
    }

    fn next_due(&self, until_ms: u64) -> Option<(TimerId, u64)> {
        self.timers
            .iter()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(id, timer)| (timer.due_ms, **id))
            .map(|(id, timer)| (*id, timer.due_ms))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Clone, Default)]
/// Deterministic timer service driven explicitly by [`ManualTimerService::advance`].
///
/// Used by headless hosts and tests: nothing fires until virtual time is advanced, and due
/// callbacks run in due-time order (ties broken by registration order).
pub struct ManualTimerService {
    inner: Rc<RefCell<ManualTimerState>>,
}

impl ManualTimerService {
    /// Creates a manual timer service at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances virtual time by `by`, firing every timer that comes due on the way.
    ///
    /// Returns the number of callbacks invoked. Callbacks may schedule or clear timers.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.borrow().now_ms.saturating_add(duration_ms(by));
        let mut fired = 0usize;

        loop {
            let callback = {
                let mut state = self.inner.borrow_mut();
                let Some((id, due_ms)) = state.next_due(target) else {
                    break;
                };
                state.now_ms = due_ms;
                let reschedule = state.timers.get(&id).and_then(|timer| timer.period_ms);
                match reschedule {
                    Some(period_ms) => {
                        let Some(timer) = state.timers.get_mut(&id) else {
                            break;
                        };
                        timer.due_ms = due_ms.saturating_add(period_ms);
                        Rc::clone(&timer.callback)
                    }
                    None => match state.timers.remove(&id) {
                        Some(timer) => timer.callback,
                        None => break,
                    },
                }
            };
            callback();
            fired += 1;
        }

        self.inner.borrow_mut().now_ms = target;
        fired
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Number of timers that are still scheduled.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Returns whether `id` is still scheduled.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.inner.borrow().timers.contains_key(&id)
    }
}

impl TimerService for ManualTimerService {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        self.inner.borrow_mut().insert(delay, None, callback)
    }

    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId {
        self.inner.borrow_mut().insert(period, Some(period), callback)
    }

    fn clear(&self, id: TimerId) {
        self.inner.borrow_mut().timers.remove(&id);
    }
}

#[derive(Clone)]
/// A set of timers owned by one component (the session, or one hosted window).
///
/// Every timer created through the scope is tracked until it fires (timeouts) or is cleared, so
/// the owner can cancel everything it started with [`ScopedTimers::clear_all`]. Clones share the
/// same set.
pub struct ScopedTimers {
    service: Rc<dyn TimerService>,
    owned: Rc<RefCell<BTreeSet<TimerId>>>,
}

impl ScopedTimers {
    /// Creates an empty scope over `service`.
    pub fn new(service: Rc<dyn TimerService>) -> Self {
        Self {
            service,
            owned: Rc::new(RefCell::new(BTreeSet::new())),
        }
    }

    /// Schedules a one-shot timer owned by this scope.
    pub fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let slot = Rc::new(Cell::new(None::<TimerId>));
        let owned = Rc::clone(&self.owned);
        let fired_slot = Rc::clone(&slot);
        let id = self.service.set_timeout(
            delay,
            Rc::new(move || {
                if let Some(id) = fired_slot.get() {
                    owned.borrow_mut().remove(&id);
                }
                callback();
            }),
        );
        slot.set(Some(id));
        self.owned.borrow_mut().insert(id);
        id
    }

    /// Schedules a repeating timer owned by this scope.
    pub fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId {
        let id = self.service.set_interval(period, callback);
        self.owned.borrow_mut().insert(id);
        id
    }

    /// Cancels one owned timer. Ids not owned by this scope are ignored.
    pub fn clear(&self, id: TimerId) {
        if self.owned.borrow_mut().remove(&id) {
            self.service.clear(id);
        }
    }

    /// Cancels every timer owned by this scope.
    pub fn clear_all(&self) {
        let ids = std::mem::take(&mut *self.owned.borrow_mut());
        for id in ids {
            self.service.clear(id);
        }
    }

    /// Number of live timers owned by this scope.
    pub fn len(&self) -> usize {
        self.owned.borrow().len()
    }

    /// Returns whether the scope owns no live timers.
    pub fn is_empty(&self) -> bool {
        self.owned.borrow().is_empty()
    }

    /// Creates a new, empty scope on the same underlying service.
    pub fn sibling(&self) -> Self {
        Self::new(Rc::clone(&self.service))
    }
}
