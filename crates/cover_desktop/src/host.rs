//! Browser-side host adapters used by the view layer.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
    time::Duration,
};

use cover_host::{SoundCue, SoundService, TimerCallback, TimerId, TimerService};
use leptos::{
    leptos_dom::helpers::{IntervalHandle, TimeoutHandle},
    logging, set_interval_with_handle, set_timeout_with_handle,
};

#[derive(Clone, Copy)]
enum BrowserHandle {
    Timeout(TimeoutHandle),
    Interval(IntervalHandle),
}

impl BrowserHandle {
    fn clear(self) {
        match self {
            Self::Timeout(handle) => handle.clear(),
            Self::Interval(handle) => handle.clear(),
        }
    }
}

#[derive(Clone, Default)]
/// [`TimerService`] over the browser event loop.
///
/// A timer the browser refuses to schedule is logged and reported under an id that is never
/// live, so clearing it is a no-op.
pub struct BrowserTimerService {
    next_id: Rc<Cell<u64>>,
    handles: Rc<RefCell<HashMap<TimerId, BrowserHandle>>>,
}

impl BrowserTimerService {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&self) -> TimerId {
        let id = self.next_id.get().saturating_add(1);
        self.next_id.set(id);
        TimerId(id)
    }
}

impl TimerService for BrowserTimerService {
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = self.allocate();
        let handles = Rc::clone(&self.handles);
        let scheduled = set_timeout_with_handle(
            move || {
                handles.borrow_mut().remove(&id);
                callback();
            },
            delay,
        );
        match scheduled {
            Ok(handle) => {
                self.handles
                    .borrow_mut()
                    .insert(id, BrowserHandle::Timeout(handle));
            }
            Err(err) => logging::warn!("timeout not scheduled: {err:?}"),
        }
        id
    }

    fn set_interval(&self, period: Duration, callback: TimerCallback) -> TimerId {
        let id = self.allocate();
        match set_interval_with_handle(move || callback(), period) {
            Ok(handle) => {
                self.handles
                    .borrow_mut()
                    .insert(id, BrowserHandle::Interval(handle));
            }
            Err(err) => logging::warn!("interval not scheduled: {err:?}"),
        }
        id
    }

    fn clear(&self, id: TimerId) {
        let handle = self.handles.borrow_mut().remove(&id);
        if let Some(handle) = handle {
            handle.clear();
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Sound collaborator for hosts without audio: logs every notification.
pub struct LoggingSoundService;

impl SoundService for LoggingSoundService {
    fn suspend_background(&self) {
        logging::log!("sound: suspend background");
    }

    fn release_background(&self) {
        logging::log!("sound: release background");
    }

    fn play(&self, cue: SoundCue) {
        logging::log!("sound: {}", cue.token());
    }
}
