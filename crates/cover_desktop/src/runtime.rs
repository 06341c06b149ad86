//! Shared handle over the session, for hosts and the view layer.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use leptos::logging::warn;

use crate::{
    config::DesktopSkin,
    model::{SessionState, Window, WindowId},
    reducer::DesktopAction,
    session::SessionController,
    taskbar::{project_dock, project_taskbar, DockEntry, TaskbarIndicator},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Read model handed to observers after every change.
pub struct SessionSnapshot {
    pub state: SessionState,
    pub active: bool,
    /// Live windows bottom to top, minimized ones included.
    pub windows: Vec<Window>,
    pub focused: Option<WindowId>,
    pub dragging: Option<WindowId>,
    pub taskbar: Vec<TaskbarIndicator>,
    pub dock: Vec<DockEntry>,
    pub assistant_tip: Option<String>,
    pub skin: DesktopSkin,
}

impl SessionSnapshot {
    pub fn capture(session: &SessionController) -> Self {
        let registry = session.registry();
        Self {
            state: session.state(),
            active: session.is_active(),
            windows: registry
                .map(|r| r.windows_in_paint_order().into_iter().cloned().collect())
                .unwrap_or_default(),
            focused: registry.and_then(|r| r.focused()),
            dragging: session.drag().dragged_window(),
            taskbar: registry.map(project_taskbar).unwrap_or_default(),
            dock: registry.map(project_dock).unwrap_or_default(),
            assistant_tip: session.assistant_tip().map(str::to_string),
            skin: session.config().skin,
        }
    }

    /// Visible windows bottom to top.
    pub fn visible_windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter().filter(|window| !window.minimized)
    }
}

type Observer = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Clone)]
/// Clonable handle over one [`SessionController`].
///
/// Timer callbacks wake the runtime, which applies queued session events and notifies observers.
/// Observers run after the session borrow is released, so they may dispatch.
pub struct DesktopRuntime {
    session: Rc<RefCell<SessionController>>,
    observers: Rc<RefCell<Vec<Observer>>>,
}

struct WeakRuntime {
    session: Weak<RefCell<SessionController>>,
    observers: Weak<RefCell<Vec<Observer>>>,
}

impl WeakRuntime {
    fn upgrade(&self) -> Option<DesktopRuntime> {
        Some(DesktopRuntime {
            session: self.session.upgrade()?,
            observers: self.observers.upgrade()?,
        })
    }
}

impl DesktopRuntime {
    pub fn new(session: SessionController) -> Self {
        let runtime = Self {
            session: Rc::new(RefCell::new(session)),
            observers: Rc::new(RefCell::new(Vec::new())),
        };
        let weak = WeakRuntime {
            session: Rc::downgrade(&runtime.session),
            observers: Rc::downgrade(&runtime.observers),
        };
        runtime.session.borrow_mut().set_waker(Rc::new(move || {
            if let Some(runtime) = weak.upgrade() {
                runtime.process_events();
            }
        }));
        runtime
    }

    /// Applies `action`. Rejections are logged and reported as `false`.
    pub fn dispatch(&self, action: DesktopAction) -> bool {
        let result = {
            let mut session = self.session.borrow_mut();
            let result = session.dispatch(action);
            session.process_events();
            result
        };
        if let Err(err) = &result {
            warn!("desktop session rejected action: {err}");
        }
        self.notify();
        result.is_ok()
    }

    pub fn activate(&self) -> bool {
        self.dispatch(DesktopAction::Activate)
    }

    pub fn deactivate(&self) -> bool {
        self.dispatch(DesktopAction::Deactivate)
    }

    /// Applies queued timer events. Skipped while the session is borrowed; the dispatch holding
    /// the borrow processes them instead.
    pub fn process_events(&self) -> usize {
        let applied = match self.session.try_borrow_mut() {
            Ok(mut session) => session.process_events(),
            Err(_) => return 0,
        };
        if applied > 0 {
            self.notify();
        }
        applied
    }

    /// Registers an observer called with a fresh snapshot after every change.
    pub fn subscribe(&self, observer: impl Fn(&SessionSnapshot) + 'static) {
        self.observers.borrow_mut().push(Rc::new(observer));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.session.borrow())
    }

    /// Runs `read` against the session.
    pub fn with_session<R>(&self, read: impl FnOnce(&SessionController) -> R) -> R {
        read(&self.session.borrow())
    }

    fn notify(&self) {
        let observers: Vec<Observer> = self.observers.borrow().clone();
        if observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in observers {
            observer(&snapshot);
        }
    }
}

impl std::fmt::Debug for DesktopRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopRuntime")
            .field("session", &self.session)
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cover_app_contract::ApplicationId;
    use cover_host::{HostServices, ManualTimerService, NoopSoundService};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::DesktopConfig;

    fn runtime() -> (DesktopRuntime, ManualTimerService) {
        let timers = ManualTimerService::new();
        let host = HostServices::new(Rc::new(timers.clone()), Rc::new(NoopSoundService));
        let runtime = DesktopRuntime::new(SessionController::new(DesktopConfig::default(), host));
        (runtime, timers)
    }

    #[test]
    fn timers_wake_the_runtime_and_observers_see_login() {
        let (runtime, timers) = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        runtime.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.state));

        runtime.activate();
        timers.advance(Duration::from_millis(3_000));

        assert_eq!(
            *seen.borrow(),
            vec![SessionState::Boot, SessionState::Login]
        );
        assert_eq!(runtime.snapshot().state, SessionState::Login);
    }

    #[test]
    fn rejected_actions_are_reported_not_raised() {
        let (runtime, _timers) = runtime();
        assert!(!runtime.dispatch(DesktopAction::OpenApp {
            app_id: ApplicationId::trusted("excel"),
        }));
        assert!(!runtime.snapshot().active);
    }

    #[test]
    fn snapshot_lists_windows_in_paint_order() {
        let (runtime, timers) = runtime();
        runtime.activate();
        timers.advance(Duration::from_millis(3_000));
        runtime.dispatch(DesktopAction::SubmitCredentials {
            input: "letmein".to_string(),
        });
        for app in ["excel", "word", "excel"] {
            runtime.dispatch(DesktopAction::OpenApp {
                app_id: ApplicationId::trusted(app),
            });
        }

        let snapshot = runtime.snapshot();
        let order: Vec<&str> = snapshot.windows.iter().map(|w| w.app_id.as_str()).collect();
        assert_eq!(order, vec!["word", "excel"]);
        assert_eq!(snapshot.focused, Some(WindowId(1)));
        assert_eq!(snapshot.taskbar.len(), 2);
        assert_eq!(snapshot.visible_windows().count(), 2);
    }
}
