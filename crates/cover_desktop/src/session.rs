//! Session lifecycle: boot, login, desktop, crash, and activation by the host game.

use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use cover_app_contract::{AppCommand, AppCommandSink, AppInput, ApplicationId};
use cover_host::{HostServices, ScopedTimers, SoundCue, TimerCallback};
use leptos::logging::{log, warn};
use thiserror::Error;

use crate::{
    apps::AppCatalog,
    config::DesktopConfig,
    drag::{DragController, DragError},
    model::{
        OpenOutcome, OpenWindowRequest, PointerPosition, PointerTarget, SessionState, WindowId,
    },
    taskbar,
    window_manager::WindowRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// Operation rejected by the session. Callers log these and carry on.
pub enum SessionError {
    /// The session is hidden; nothing but `activate` is accepted.
    #[error("session is inactive")]
    Inactive,
    /// The operation belongs to another session state.
    #[error("`{action}` is not available while {}", .state.token())]
    WrongState {
        /// Rejected operation.
        action: &'static str,
        /// State the session was in.
        state: SessionState,
    },
    /// The drag controller refused a gesture.
    #[error(transparent)]
    Drag(#[from] DragError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a credential submission.
pub enum LoginOutcome {
    /// Empty input; the session stays on the login screen.
    Rejected,
    Desktop,
    /// The shortcut code: desktop with the shortcut app already open.
    DesktopWithApp(WindowId),
    /// The crash code.
    Crashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEvent {
    BootComplete { generation: u64 },
    AssistantTick { generation: u64 },
}

type Waker = Rc<dyn Fn()>;

/// Top-level state machine. Owns one [`WindowRegistry`] per desktop entry.
///
/// Timer callbacks never touch the controller: they queue a [`SessionEvent`] tagged with the
/// timer generation and call the waker, and [`SessionController::process_events`] applies it.
/// Every deactivation, crash and reboot bumps the generation, so callbacks from an earlier
/// phase are ignored even if they were already queued.
pub struct SessionController {
    state: SessionState,
    active: bool,
    activated_once: bool,
    config: DesktopConfig,
    catalog: Rc<AppCatalog>,
    host: HostServices,
    registry: Option<WindowRegistry>,
    drag: DragController,
    timers: ScopedTimers,
    generation: u64,
    events: Rc<RefCell<VecDeque<SessionEvent>>>,
    waker: Rc<RefCell<Option<Waker>>>,
    commands: AppCommandSink,
    assistant_tip: Option<usize>,
}

impl SessionController {
    /// Creates an inactive session with the built-in app catalog for `config`.
    pub fn new(config: DesktopConfig, host: HostServices) -> Self {
        let catalog = AppCatalog::from_config(&config);
        Self::with_catalog(config, catalog, host)
    }

    /// Creates an inactive session over a host-supplied catalog.
    pub fn with_catalog(config: DesktopConfig, catalog: AppCatalog, host: HostServices) -> Self {
        Self {
            state: SessionState::Boot,
            active: false,
            activated_once: false,
            config,
            catalog: Rc::new(catalog),
            timers: ScopedTimers::new(Rc::clone(&host.timers)),
            host,
            registry: None,
            drag: DragController::new(),
            generation: 0,
            events: Rc::new(RefCell::new(VecDeque::new())),
            waker: Rc::new(RefCell::new(None)),
            commands: AppCommandSink::default(),
            assistant_tip: None,
        }
    }

    /// Installs the callback run after a timer queues a session event.
    pub fn set_waker(&mut self, waker: Waker) {
        *self.waker.borrow_mut() = Some(waker);
    }

    /// Shows the session. Returns `false` when it was already active.
    ///
    /// The first activation, and any activation after a crash, starts at Boot. Otherwise the
    /// previous state resumes: a Boot sequence restarts its delay and desktop apps are resumed.
    pub fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.host.sound.suspend_background();

        if !self.activated_once || self.state == SessionState::Crashed {
            self.activated_once = true;
            self.enter_boot();
            return true;
        }

        match self.state {
            SessionState::Boot => self.schedule_boot(),
            SessionState::Desktop => {
                if let Some(registry) = self.registry.as_mut() {
                    registry.resume_all();
                }
                self.start_assistant();
            }
            SessionState::Login | SessionState::Crashed => {}
        }
        log!("cover desktop: resumed in {}", self.state.token());
        true
    }

    /// Hides the session and cancels every timer it owns. Returns `false` when already inactive.
    ///
    /// State is kept for the next [`SessionController::activate`]; desktop windows stay open but
    /// their apps are suspended with their timers cleared.
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.cancel_session_timers();
        self.drag.reset();
        if let Some(registry) = self.registry.as_mut() {
            registry.suspend_all();
        }
        self.commands.clear();
        self.host.sound.release_background();
        log!("cover desktop: deactivated in {}", self.state.token());
        true
    }

    /// Applies queued timer events. Returns how many took effect.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let next = self.events.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            if self.apply_event(event) {
                applied += 1;
            }
        }
        self.drain_app_commands();
        applied
    }

    fn apply_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::BootComplete { generation }
                if generation == self.generation
                    && self.active
                    && self.state == SessionState::Boot =>
            {
                self.state = SessionState::Login;
                log!("cover desktop: boot complete");
                true
            }
            SessionEvent::AssistantTick { generation }
                if generation == self.generation
                    && self.active
                    && self.state == SessionState::Desktop =>
            {
                let count = self.config.assistant.tips.len();
                if count == 0 {
                    return false;
                }
                self.assistant_tip = Some(self.assistant_tip.map_or(0, |tip| (tip + 1) % count));
                true
            }
            _ => false,
        }
    }

    /// Submits the login form.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the login screen.
    pub fn submit_credentials(&mut self, input: &str) -> Result<LoginOutcome, SessionError> {
        self.require("submit credentials", SessionState::Login)?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(LoginOutcome::Rejected);
        }

        if input == self.config.login.crash_code {
            self.enter_crashed();
            return Ok(LoginOutcome::Crashed);
        }

        self.enter_desktop();
        if input == self.config.login.shortcut_code {
            let app_id = ApplicationId::trusted(self.config.login.shortcut_app.as_str());
            let outcome = self.open_app(app_id)?;
            return Ok(LoginOutcome::DesktopWithApp(outcome.window_id()));
        }
        Ok(LoginOutcome::Desktop)
    }

    /// Simulated system failure. Closes every window.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn crash(&mut self) -> Result<(), SessionError> {
        self.require("crash", SessionState::Desktop)?;
        self.enter_crashed();
        Ok(())
    }

    /// Reboots from the crash screen. Always lands on Boot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the crash screen.
    pub fn acknowledge_crash(&mut self) -> Result<(), SessionError> {
        self.require("acknowledge crash", SessionState::Crashed)?;
        log!("cover desktop: rebooting");
        self.enter_boot();
        Ok(())
    }

    /// Opens `app_id`, or focuses its running window.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn open_app(&mut self, app_id: ApplicationId) -> Result<OpenOutcome, SessionError> {
        let registry = self.desktop_registry("open app")?;
        Ok(registry.open(OpenWindowRequest::new(app_id)))
    }

    /// Taskbar or dock click.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn activate_indicator(&mut self, app_id: &ApplicationId) -> Result<OpenOutcome, SessionError> {
        let registry = self.desktop_registry("activate indicator")?;
        Ok(taskbar::activate_indicator(registry, app_id))
    }

    /// Focuses a window. `Ok(false)` means the window no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn focus_window(&mut self, window_id: WindowId) -> Result<bool, SessionError> {
        Ok(self.desktop_registry("focus window")?.focus(window_id))
    }

    /// Minimizes a window. `Ok(false)` means the window no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn minimize_window(&mut self, window_id: WindowId) -> Result<bool, SessionError> {
        self.require("minimize window", SessionState::Desktop)?;
        if self.drag.dragged_window() == Some(window_id) {
            self.end_drag();
        }
        Ok(self.desktop_registry("minimize window")?.minimize(window_id))
    }

    /// Closes a window, dropping any drag of it first. `Ok(false)` means it was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn close_window(&mut self, window_id: WindowId) -> Result<bool, SessionError> {
        self.require("close window", SessionState::Desktop)?;
        self.drag.invalidate_window(window_id);
        Ok(self.desktop_registry("close window")?.close(window_id))
    }

    /// Pointer pressed on part of a window.
    ///
    /// Title bars start a drag, content focuses the window, and controls are left to their own
    /// click handlers.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] outside the desktop, or [`SessionError::Drag`] when the drag
    /// controller refuses the gesture.
    pub fn pointer_down(
        &mut self,
        window_id: WindowId,
        target: PointerTarget,
        pointer: PointerPosition,
    ) -> Result<(), SessionError> {
        let action = "pointer down";
        self.require(action, SessionState::Desktop)?;
        let state = self.state;
        let Some(registry) = self.registry.as_mut() else {
            return Err(SessionError::WrongState { action, state });
        };
        match target {
            PointerTarget::TitleBar => self.drag.begin(registry, window_id, target, pointer)?,
            PointerTarget::Content => {
                registry.focus(window_id);
            }
            PointerTarget::Control => {}
        }
        Ok(())
    }

    /// Pointer moved anywhere. Returns whether a dragged window moved.
    pub fn pointer_move(&mut self, pointer: PointerPosition) -> bool {
        match self.registry.as_mut() {
            Some(registry) if self.active => self.drag.update(registry, pointer),
            _ => false,
        }
    }

    /// Pointer released anywhere. Returns the window whose drag ended, if any.
    pub fn pointer_up(&mut self) -> Option<WindowId> {
        self.end_drag()
    }

    /// Routes input to a window's app. `Ok(false)` means the window no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] unless the session is active on the desktop.
    pub fn app_input(&mut self, window_id: WindowId, input: &AppInput) -> Result<bool, SessionError> {
        Ok(self
            .desktop_registry("app input")?
            .deliver_input(window_id, input))
    }

    /// Applies commands queued by apps. Returns how many were taken off the queue.
    pub fn drain_app_commands(&mut self) -> usize {
        let mut drained = 0;
        while let Some((window_id, command)) = self.commands.pop() {
            drained += 1;
            let window_id = WindowId(window_id);
            let applied = match command {
                AppCommand::CloseWindow => self.close_window(window_id).map(|_| ()),
                AppCommand::RequestCrash => self.crash(),
                AppCommand::OpenApp(app_id) => self.open_app(app_id).map(|_| ()),
                AppCommand::SetTitle(title) => self
                    .desktop_registry("set title")
                    .map(|registry| {
                        registry.set_title(window_id, title);
                    }),
            };
            if let Err(err) = applied {
                warn!("cover desktop: app command from {window_id:?} ignored: {err}");
            }
        }
        drained
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    /// The current desktop's registry. `None` outside the desktop.
    pub fn registry(&self) -> Option<&WindowRegistry> {
        self.registry.as_ref()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Tip currently shown by the assistant bubble.
    pub fn assistant_tip(&self) -> Option<&str> {
        self.assistant_tip
            .and_then(|idx| self.config.assistant.tips.get(idx))
            .map(String::as_str)
    }

    /// Hides the assistant bubble until the next tip.
    pub fn dismiss_assistant(&mut self) {
        self.assistant_tip = None;
    }

    fn enter_boot(&mut self) {
        self.teardown_desktop();
        self.state = SessionState::Boot;
        self.host.sound.play(SoundCue::Startup);
        self.schedule_boot();
        log!("cover desktop: booting");
    }

    fn enter_desktop(&mut self) {
        self.teardown_desktop();
        self.registry = Some(WindowRegistry::new(
            Rc::clone(&self.catalog),
            self.config.cascade,
            self.host.clone(),
            self.commands.clone(),
        ));
        self.state = SessionState::Desktop;
        self.host.sound.play(SoundCue::Click);
        self.start_assistant();
        log!("cover desktop: logged in");
    }

    fn enter_crashed(&mut self) {
        self.teardown_desktop();
        self.state = SessionState::Crashed;
        self.host.sound.play(SoundCue::Crash);
        log!("cover desktop: crashed");
    }

    /// Closes every window and cancels everything started since the last phase change.
    fn teardown_desktop(&mut self) {
        self.cancel_session_timers();
        self.drag.reset();
        if let Some(mut registry) = self.registry.take() {
            registry.close_all();
        }
        self.commands.clear();
        self.assistant_tip = None;
    }

    fn cancel_session_timers(&mut self) {
        self.timers.clear_all();
        self.events.borrow_mut().clear();
        self.generation = self.generation.wrapping_add(1);
    }

    fn schedule_boot(&mut self) {
        let event = SessionEvent::BootComplete {
            generation: self.generation,
        };
        self.timers.set_timeout(
            Duration::from_millis(self.config.boot_delay_ms),
            self.event_callback(event),
        );
    }

    fn start_assistant(&mut self) {
        let assistant = &self.config.assistant;
        if !assistant.enabled || assistant.tips.is_empty() || assistant.interval_ms == 0 {
            return;
        }
        let period = Duration::from_millis(assistant.interval_ms);
        let event = SessionEvent::AssistantTick {
            generation: self.generation,
        };
        self.timers.set_interval(period, self.event_callback(event));
    }

    fn event_callback(&self, event: SessionEvent) -> TimerCallback {
        let events = Rc::clone(&self.events);
        let waker = Rc::clone(&self.waker);
        Rc::new(move || {
            events.borrow_mut().push_back(event);
            let wake = waker.borrow().clone();
            if let Some(wake) = wake {
                wake();
            }
        })
    }

    fn end_drag(&mut self) -> Option<WindowId> {
        match self.registry.as_mut() {
            Some(registry) => self.drag.end(registry),
            None => {
                self.drag.reset();
                None
            }
        }
    }

    fn require(&self, action: &'static str, state: SessionState) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::Inactive);
        }
        if self.state != state {
            return Err(self.wrong_state(action));
        }
        Ok(())
    }

    fn wrong_state(&self, action: &'static str) -> SessionError {
        SessionError::WrongState {
            action,
            state: self.state,
        }
    }

    fn desktop_registry(&mut self, action: &'static str) -> Result<&mut WindowRegistry, SessionError> {
        self.require(action, SessionState::Desktop)?;
        let state = self.state;
        self.registry
            .as_mut()
            .ok_or(SessionError::WrongState { action, state })
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("generation", &self.generation)
            .field("registry", &self.registry)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use cover_app_contract::AppHost;
    use cover_host::{ManualTimerService, RecordingSoundService, SoundEvent};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::apps::{ArcadeApp, ARCADE_TICK_MS};

    struct Harness {
        session: SessionController,
        timers: Rc<ManualTimerService>,
        sound: RecordingSoundService,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_catalog(AppCatalog::from_config(&DesktopConfig::default()))
        }

        fn with_catalog(catalog: AppCatalog) -> Self {
            let timers = Rc::new(ManualTimerService::new());
            let sound = RecordingSoundService::default();
            let host = HostServices::new(timers.clone(), Rc::new(sound.clone()));
            Self {
                session: SessionController::with_catalog(DesktopConfig::default(), catalog, host),
                timers,
                sound,
            }
        }

        fn advance(&mut self, ms: u64) {
            self.timers.advance(Duration::from_millis(ms));
            self.session.process_events();
        }

        fn login(&mut self) {
            self.session.activate();
            self.advance(3_000);
            assert_eq!(
                self.session.submit_credentials("hunter2"),
                Ok(LoginOutcome::Desktop)
            );
        }

        fn open(&mut self, app: &str) -> WindowId {
            self.session
                .open_app(ApplicationId::trusted(app))
                .expect("desktop is up")
                .window_id()
        }

        fn window_count(&self) -> usize {
            self.session.registry().map_or(0, WindowRegistry::len)
        }
    }

    fn counting_arcade_catalog(ticks: &Rc<Cell<u64>>) -> AppCatalog {
        let mut catalog = AppCatalog::from_config(&DesktopConfig::default());
        let ticks = Rc::clone(ticks);
        catalog.set_factory(
            &ApplicationId::trusted("snake"),
            Rc::new(move || {
                Box::new(ArcadeApp::with_tick_counter(Rc::clone(&ticks))) as Box<dyn AppHost>
            }),
        );
        catalog
    }

    #[test]
    fn boot_reaches_login_after_the_delay_with_no_windows() {
        let mut h = Harness::new();
        assert!(h.session.activate());
        assert_eq!(h.session.state(), SessionState::Boot);

        h.advance(2_999);
        assert_eq!(h.session.state(), SessionState::Boot);
        h.advance(1);
        assert_eq!(h.session.state(), SessionState::Login);
        assert_eq!(h.window_count(), 0);
        assert!(h.session.registry().is_none());
    }

    #[test]
    fn activation_is_idempotent_and_notifies_sound() {
        let mut h = Harness::new();
        assert!(h.session.activate());
        assert!(!h.session.activate());
        assert!(h.session.deactivate());
        assert!(!h.session.deactivate());

        assert_eq!(
            h.sound.events(),
            vec![
                SoundEvent::SuspendBackground,
                SoundEvent::Play(SoundCue::Startup),
                SoundEvent::ReleaseBackground,
            ]
        );
    }

    #[test]
    fn deactivating_during_boot_restarts_the_delay_on_return() {
        let mut h = Harness::new();
        h.session.activate();
        h.advance(2_000);
        h.session.deactivate();
        h.advance(5_000);
        assert_eq!(h.session.state(), SessionState::Boot);

        h.session.activate();
        h.advance(2_999);
        assert_eq!(h.session.state(), SessionState::Boot);
        h.advance(1);
        assert_eq!(h.session.state(), SessionState::Login);
    }

    #[test]
    fn queued_boot_event_from_before_deactivation_is_ignored() {
        let mut h = Harness::new();
        h.session.activate();
        h.timers.advance(Duration::from_millis(3_000));
        h.session.deactivate();
        h.session.activate();

        assert_eq!(h.session.process_events(), 0);
        assert_eq!(h.session.state(), SessionState::Boot);
    }

    #[test]
    fn empty_credentials_stay_on_login() {
        let mut h = Harness::new();
        h.session.activate();
        h.advance(3_000);

        assert_eq!(h.session.submit_credentials("   "), Ok(LoginOutcome::Rejected));
        assert_eq!(h.session.state(), SessionState::Login);
    }

    #[test]
    fn crash_code_routes_to_crash_screen() {
        let mut h = Harness::new();
        h.session.activate();
        h.advance(3_000);

        assert_eq!(h.session.submit_credentials("666"), Ok(LoginOutcome::Crashed));
        assert_eq!(h.session.state(), SessionState::Crashed);
        assert!(h.session.registry().is_none());
        assert!(h.sound.events().contains(&SoundEvent::Play(SoundCue::Crash)));
    }

    #[test]
    fn shortcut_code_opens_the_shortcut_app() {
        let mut h = Harness::new();
        h.session.activate();
        h.advance(3_000);

        let outcome = h.session.submit_credentials("4242").expect("login accepted");
        let LoginOutcome::DesktopWithApp(window_id) = outcome else {
            panic!("expected shortcut login, got {outcome:?}");
        };
        let registry = h.session.registry().expect("desktop registry");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.focused(), Some(window_id));
        assert_eq!(
            registry.get(window_id).map(|w| w.app_id.as_str()),
            Some("minesweeper")
        );
    }

    #[test]
    fn desktop_cannot_be_reached_without_login() {
        let mut h = Harness::new();
        h.session.activate();
        assert_eq!(
            h.session.submit_credentials("hunter2"),
            Err(SessionError::WrongState {
                action: "submit credentials",
                state: SessionState::Boot,
            })
        );
        assert!(h.session.open_app(ApplicationId::trusted("excel")).is_err());
        assert_eq!(h.session.state(), SessionState::Boot);
    }

    #[test]
    fn crash_empties_the_desktop_and_reboot_goes_to_boot() {
        let mut h = Harness::new();
        h.login();
        h.open("excel");
        h.open("word");
        assert_eq!(h.window_count(), 2);

        h.session.crash().expect("crash from desktop");
        assert_eq!(h.session.state(), SessionState::Crashed);
        assert_eq!(h.window_count(), 0);
        assert!(h.session.drag().active().is_none());
        assert_eq!(h.timers.active_count(), 0);

        h.session.acknowledge_crash().expect("reboot");
        assert_eq!(h.session.state(), SessionState::Boot);
        h.advance(3_000);
        assert_eq!(h.session.state(), SessionState::Login);
        assert_eq!(h.window_count(), 0);
    }

    #[test]
    fn crash_is_not_resumable_across_activation() {
        let mut h = Harness::new();
        h.login();
        h.session.crash().expect("crash");
        h.session.deactivate();
        h.session.activate();
        assert_eq!(h.session.state(), SessionState::Boot);
    }

    #[test]
    fn desktop_resumes_with_windows_intact() {
        let mut h = Harness::new();
        h.login();
        let excel = h.open("excel");
        h.session.deactivate();
        assert_eq!(
            h.session.open_app(ApplicationId::trusted("word")),
            Err(SessionError::Inactive)
        );

        h.session.activate();
        assert_eq!(h.session.state(), SessionState::Desktop);
        assert_eq!(h.session.registry().and_then(WindowRegistry::focused), Some(excel));
    }

    #[test]
    fn deactivation_stops_app_ticks() {
        let ticks = Rc::new(Cell::new(0));
        let mut h = Harness::with_catalog(counting_arcade_catalog(&ticks));
        h.login();
        h.open("snake");
        h.advance(ARCADE_TICK_MS * 5);
        assert_eq!(ticks.get(), 5);

        h.session.deactivate();
        h.advance(ARCADE_TICK_MS * 50);
        assert_eq!(ticks.get(), 5);
        assert_eq!(h.timers.active_count(), 0);

        h.session.activate();
        h.advance(ARCADE_TICK_MS * 2);
        assert_eq!(ticks.get(), 7);
    }

    #[test]
    fn assistant_rotates_tips_only_while_active() {
        let mut h = Harness::new();
        h.login();
        assert_eq!(h.session.assistant_tip(), None);

        h.advance(15_000);
        let tips = h.session.config().assistant.tips.clone();
        assert_eq!(h.session.assistant_tip(), Some(tips[0].as_str()));
        h.advance(15_000);
        assert_eq!(h.session.assistant_tip(), Some(tips[1].as_str()));

        h.session.deactivate();
        h.advance(60_000);
        assert_eq!(h.session.assistant_tip(), Some(tips[1].as_str()));
    }

    #[test]
    fn terminal_commands_reach_the_session() {
        let mut h = Harness::new();
        h.login();
        h.open("excel");
        let terminal = h.open("terminal");

        h.session
            .app_input(terminal, &AppInput::Submit("exit".to_string()))
            .expect("input delivered");
        h.session.drain_app_commands();
        assert_eq!(h.window_count(), 1);

        let terminal = h.open("terminal");
        h.session
            .app_input(terminal, &AppInput::Submit("bsod".to_string()))
            .expect("input delivered");
        h.session.drain_app_commands();
        assert_eq!(h.session.state(), SessionState::Crashed);
        assert_eq!(h.window_count(), 0);
    }

    #[test]
    fn closing_a_window_mid_drag_drops_the_gesture() {
        let mut h = Harness::new();
        h.login();
        let excel = h.open("excel");
        h.session
            .pointer_down(excel, PointerTarget::TitleBar, PointerPosition { x: 60, y: 60 })
            .expect("drag starts");

        assert_eq!(h.session.close_window(excel), Ok(true));
        assert!(h.session.drag().active().is_none());
        assert!(!h.session.pointer_move(PointerPosition { x: 200, y: 200 }));
        assert_eq!(h.session.pointer_up(), None);
    }

    #[test]
    fn stale_window_operations_are_noops() {
        let mut h = Harness::new();
        h.login();
        let excel = h.open("excel");
        h.session.close_window(excel).expect("close");

        assert_eq!(h.session.close_window(excel), Ok(false));
        assert_eq!(h.session.focus_window(excel), Ok(false));
        assert_eq!(h.session.minimize_window(excel), Ok(false));
        assert_eq!(
            h.session.app_input(excel, &AppInput::Key("a".to_string())),
            Ok(false)
        );
    }
}
