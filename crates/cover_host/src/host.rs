//! Host service bundle injected into the desktop runtime.

use std::rc::Rc;

use crate::{NoopSoundService, NoopTimerService, SoundService, TimerService};

/// Runtime-selected collaborator bundle.
///
/// All environment-specific selection (browser timers, the game's sound manager, manual timers in
/// tests) happens before this bundle crosses into the runtime, which keeps the window manager
/// independent of the host.
#[derive(Clone)]
pub struct HostServices {
    /// Event-loop timers.
    pub timers: Rc<dyn TimerService>,
    /// Sound/telemetry notifications.
    pub sound: Rc<dyn SoundService>,
}

impl HostServices {
    /// Bundles explicit collaborators.
    pub fn new(timers: Rc<dyn TimerService>, sound: Rc<dyn SoundService>) -> Self {
        Self { timers, sound }
    }

    /// Collaborators that never fire timers and drop every sound notification.
    pub fn headless() -> Self {
        Self {
            timers: Rc::new(NoopTimerService::default()),
            sound: Rc::new(NoopSoundService),
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
