//! Sound/telemetry collaborator contract and adapters.

use std::{cell::RefCell, rc::Rc};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Named UI sound cues emitted by the desktop.
pub enum SoundCue {
    /// Boot sequence started.
    Startup,
    /// Generic UI click (login accepted).
    Click,
    /// A window was created.
    WindowOpen,
    /// A window was closed.
    WindowClose,
    /// Focus moved to another window.
    Focus,
    /// The simulated system crashed.
    Crash,
}

impl SoundCue {
    /// Returns a stable string token for host sound tables.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Click => "click",
            Self::WindowOpen => "window-open",
            Self::WindowClose => "window-close",
            Self::Focus => "focus",
            Self::Crash => "crash",
        }
    }
}

/// Host sound collaborator.
///
/// Every call is a fire-and-forget notification. Implementations must not fail loudly; the
/// desktop never inspects an outcome.
pub trait SoundService {
    /// Requests that host background audio (game music) be suspended.
    fn suspend_background(&self);

    /// Releases a previous [`SoundService::suspend_background`] request.
    fn release_background(&self);

    /// Plays a one-shot cue.
    fn play(&self, cue: SoundCue);
}

#[derive(Debug, Clone, Copy, Default)]
/// Sound service that ignores every notification.
pub struct NoopSoundService;

impl SoundService for NoopSoundService {
    fn suspend_background(&self) {}

    fn release_background(&self) {}

    fn play(&self, _cue: SoundCue) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// One notification observed by [`RecordingSoundService`].
pub enum SoundEvent {
    /// Background audio suspension requested.
    SuspendBackground,
    /// Background audio suspension released.
    ReleaseBackground,
    /// Cue played.
    Play(SoundCue),
}

#[derive(Debug, Clone, Default)]
/// Sound service that records notifications in order, for headless hosts and tests.
pub struct RecordingSoundService {
    events: Rc<RefCell<Vec<SoundEvent>>>,
}

impl RecordingSoundService {
    /// Returns every notification recorded so far.
    pub fn events(&self) -> Vec<SoundEvent> {
        self.events.borrow().clone()
    }

    /// Returns how many times `event` was recorded.
    pub fn count(&self, event: SoundEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    /// Forgets recorded notifications.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl SoundService for RecordingSoundService {
    fn suspend_background(&self) {
        self.events.borrow_mut().push(SoundEvent::SuspendBackground);
    }

    fn release_background(&self) {
        self.events.borrow_mut().push(SoundEvent::ReleaseBackground);
    }

    fn play(&self, cue: SoundCue) {
        self.events.borrow_mut().push(SoundEvent::Play(cue));
    }
}
