//! Window registry: the single writer of window records, stacking order, and focus.

use std::{collections::HashMap, rc::Rc};

use cover_app_contract::{
    AppCommandSink, AppHost, AppInput, AppLifecycleEvent, AppMountContext, AppServices,
    ApplicationId,
};
use cover_host::{HostServices, ScopedTimers, SoundCue};

use crate::{
    apps::AppCatalog,
    config::CascadeConfig,
    model::{OpenOutcome, OpenWindowRequest, PointerPosition, Window, WindowId, WindowRect},
};

struct MountedApp {
    host: Box<dyn AppHost>,
    timers: ScopedTimers,
}

/// Owns the live windows and the apps mounted in them.
///
/// Window ids and stacking orders come from counters that only grow, so neither is ever reused
/// within one registry. The focused window, when there is one, always holds the highest stacking
/// order among visible windows.
pub struct WindowRegistry {
    windows: HashMap<WindowId, Window>,
    apps: HashMap<WindowId, MountedApp>,
    by_app: HashMap<ApplicationId, WindowId>,
    next_window_id: u64,
    stack_counter: u64,
    focused: Option<WindowId>,
    catalog: Rc<AppCatalog>,
    cascade: CascadeConfig,
    host: HostServices,
    commands: AppCommandSink,
}

impl WindowRegistry {
    pub fn new(
        catalog: Rc<AppCatalog>,
        cascade: CascadeConfig,
        host: HostServices,
        commands: AppCommandSink,
    ) -> Self {
        Self {
            windows: HashMap::new(),
            apps: HashMap::new(),
            by_app: HashMap::new(),
            next_window_id: 1,
            stack_counter: 0,
            focused: None,
            catalog,
            cascade,
            host,
            commands,
        }
    }

    /// Opens `request.app_id`, or focuses its window when the app is already running.
    pub fn open(&mut self, request: OpenWindowRequest) -> OpenOutcome {
        if let Some(&existing) = self.by_app.get(&request.app_id) {
            self.focus(existing);
            return OpenOutcome::Focused(existing);
        }

        let descriptor = self.catalog.resolve(&request.app_id);
        let id = WindowId(self.next_window_id);
        self.next_window_id = self.next_window_id.saturating_add(1);

        let (x, y) = self.cascade.position(self.windows.len());
        let rect = request.rect.unwrap_or(WindowRect {
            x,
            y,
            w: descriptor.width,
            h: descriptor.height,
        });
        let window = Window {
            id,
            app_id: request.app_id.clone(),
            title: request.title.unwrap_or(descriptor.title),
            icon: descriptor.icon,
            rect,
            stack_order: self.next_stack_order(),
            minimized: false,
            dragging: false,
        };

        let timers = ScopedTimers::new(Rc::clone(&self.host.timers));
        let services = AppServices::new(
            id.0,
            timers.clone(),
            Rc::clone(&self.host.sound),
            self.commands.clone(),
        );
        let mut app = (descriptor.factory)();
        app.mount(AppMountContext {
            app_id: request.app_id.clone(),
            region: window.content_region(),
            services,
        });

        self.by_app.insert(request.app_id, id);
        self.apps.insert(id, MountedApp { host: app, timers });
        self.windows.insert(id, window);
        self.focused = Some(id);
        self.host.sound.play(SoundCue::WindowOpen);
        OpenOutcome::Created(id)
    }

    /// Raises `window_id` to the top, restores it if minimized, and makes it the focus.
    ///
    /// Returns `false` (and changes nothing) when the window does not exist.
    pub fn focus(&mut self, window_id: WindowId) -> bool {
        if !self.windows.contains_key(&window_id) {
            return false;
        }
        let stack_order = self.next_stack_order();
        let Some(window) = self.windows.get_mut(&window_id) else {
            return false;
        };
        window.stack_order = stack_order;
        let was_minimized = std::mem::replace(&mut window.minimized, false);

        let focus_changed = self.focused != Some(window_id);
        self.focused = Some(window_id);
        if was_minimized {
            self.notify(window_id, AppLifecycleEvent::Restored);
        }
        if focus_changed {
            self.notify(window_id, AppLifecycleEvent::Focused);
            self.host.sound.play(SoundCue::Focus);
        }
        true
    }

    /// Hides a window without destroying it or tearing its app down.
    ///
    /// When the minimized window held focus, focus moves to the topmost visible window.
    pub fn minimize(&mut self, window_id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(&window_id) else {
            return false;
        };
        if window.minimized {
            return true;
        }
        window.minimized = true;
        window.dragging = false;
        self.notify(window_id, AppLifecycleEvent::Minimized);

        if self.focused == Some(window_id) {
            self.focused = None;
            if let Some(next) = self.topmost_visible() {
                self.focus(next);
            }
        }
        true
    }

    /// Tears the app down and removes its window.
    ///
    /// Focus passes to the live window with the highest remaining stacking order, which is raised
    /// and restored if minimized. With no window left focus clears.
    pub fn close(&mut self, window_id: WindowId) -> bool {
        let Some(window) = self.windows.remove(&window_id) else {
            return false;
        };
        self.by_app.remove(&window.app_id);
        if let Some(mut app) = self.apps.remove(&window_id) {
            app.timers.clear_all();
            app.host.teardown();
        }

        self.host.sound.play(SoundCue::WindowClose);
        if self.focused == Some(window_id) {
            self.focused = None;
            if let Some(next) = self.topmost_live() {
                self.focus(next);
            }
        }
        true
    }

    /// Closes every window, topmost first. Returns how many were closed.
    pub fn close_all(&mut self) -> usize {
        let mut ids: Vec<WindowId> = self.windows.keys().copied().collect();
        ids.sort_by_key(|id| std::cmp::Reverse(self.windows[id].stack_order));
        self.focused = None;
        for id in &ids {
            if let Some(mut app) = self.apps.remove(id) {
                app.timers.clear_all();
                app.host.teardown();
            }
        }
        self.windows.clear();
        self.by_app.clear();
        ids.len()
    }

    /// Cancels every window's timers and tells each app it is suspended.
    pub fn suspend_all(&mut self) {
        for id in self.ids_in_open_order() {
            if let Some(app) = self.apps.get_mut(&id) {
                app.timers.clear_all();
                app.host.on_lifecycle(AppLifecycleEvent::Suspended);
            }
            if let Some(window) = self.windows.get_mut(&id) {
                window.dragging = false;
            }
        }
    }

    /// Tells each app the session is running again.
    pub fn resume_all(&mut self) {
        for id in self.ids_in_open_order() {
            self.notify(id, AppLifecycleEvent::Resumed);
        }
    }

    /// Moves a window. No clamping: windows may leave the screen entirely.
    pub fn move_to(&mut self, window_id: WindowId, x: i32, y: i32) -> bool {
        match self.windows.get_mut(&window_id) {
            Some(window) => {
                window.rect.x = x;
                window.rect.y = y;
                true
            }
            None => false,
        }
    }

    pub fn set_dragging(&mut self, window_id: WindowId, dragging: bool) -> bool {
        match self.windows.get_mut(&window_id) {
            Some(window) => {
                window.dragging = dragging;
                true
            }
            None => false,
        }
    }

    pub fn set_title(&mut self, window_id: WindowId, title: String) -> bool {
        match self.windows.get_mut(&window_id) {
            Some(window) => {
                window.title = title;
                true
            }
            None => false,
        }
    }

    /// Routes input to the app mounted in `window_id`.
    pub fn deliver_input(&mut self, window_id: WindowId, input: &AppInput) -> bool {
        match self.apps.get_mut(&window_id) {
            Some(app) => {
                app.host.handle_input(input);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, window_id: WindowId) -> Option<&Window> {
        self.windows.get(&window_id)
    }

    pub fn window_for_app(&self, app_id: &ApplicationId) -> Option<&Window> {
        self.by_app.get(app_id).and_then(|id| self.windows.get(id))
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Highest stacking order issued so far.
    pub fn last_stack_order(&self) -> u64 {
        self.stack_counter
    }

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    /// Windows bottom to top. Minimized windows are included; painters skip them.
    pub fn windows_in_paint_order(&self) -> Vec<&Window> {
        let mut windows: Vec<&Window> = self.windows.values().collect();
        windows.sort_by_key(|w| w.stack_order);
        windows
    }

    /// Windows in the order they were opened.
    pub fn windows_in_open_order(&self) -> Vec<&Window> {
        let mut windows: Vec<&Window> = self.windows.values().collect();
        windows.sort_by_key(|w| w.id);
        windows
    }

    /// Topmost visible window containing `point`.
    pub fn hit_test(&self, point: PointerPosition) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| !w.minimized && w.rect.contains(point))
            .max_by_key(|w| w.stack_order)
            .map(|w| w.id)
    }

    fn topmost_visible(&self) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| !w.minimized)
            .max_by_key(|w| w.stack_order)
            .map(|w| w.id)
    }

    fn topmost_live(&self) -> Option<WindowId> {
        self.windows
            .values()
            .max_by_key(|w| w.stack_order)
            .map(|w| w.id)
    }

    fn ids_in_open_order(&self) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> = self.windows.keys().copied().collect();
        ids.sort();
        ids
    }

    fn next_stack_order(&mut self) -> u64 {
        self.stack_counter = self.stack_counter.saturating_add(1);
        self.stack_counter
    }

    fn notify(&mut self, window_id: WindowId, event: AppLifecycleEvent) {
        if let Some(app) = self.apps.get_mut(&window_id) {
            app.host.on_lifecycle(event);
        }
    }
}

impl Drop for WindowRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}

impl std::fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("windows", &self.windows_in_paint_order())
            .field("focused", &self.focused)
            .field("stack_counter", &self.stack_counter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        cell::{Cell, RefCell},
        time::Duration,
    };

    use cover_app_contract::AppFactory;
    use cover_host::{ManualTimerService, NoopSoundService, RecordingSoundService, SoundEvent};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        apps::{AppDescriptor, ArcadeApp, ARCADE_TICK_MS},
        config::DesktopConfig,
    };

    /// App double that logs every contract call as `"<app>:<call>"`.
    pub(crate) struct RecordingApp {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl AppHost for RecordingApp {
        fn mount(&mut self, _ctx: AppMountContext) {
            self.log.borrow_mut().push(format!("{}:mount", self.name));
        }

        fn teardown(&mut self) {
            self.log.borrow_mut().push(format!("{}:teardown", self.name));
        }

        fn on_lifecycle(&mut self, event: AppLifecycleEvent) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.name, event.token()));
        }
    }

    pub(crate) fn recording_catalog(log: &Rc<RefCell<Vec<String>>>) -> AppCatalog {
        let mut catalog = AppCatalog::from_config(&DesktopConfig::default());
        for name in ["excel", "word", "ppt"] {
            let log = Rc::clone(log);
            let factory: AppFactory = Rc::new(move || {
                Box::new(RecordingApp {
                    name,
                    log: Rc::clone(&log),
                }) as Box<dyn AppHost>
            });
            catalog.set_factory(&ApplicationId::trusted(name), factory);
        }
        catalog
    }

    fn registry_with(catalog: AppCatalog, timers: Rc<ManualTimerService>) -> WindowRegistry {
        WindowRegistry::new(
            Rc::new(catalog),
            CascadeConfig::default(),
            HostServices::new(timers, Rc::new(NoopSoundService)),
            AppCommandSink::default(),
        )
    }

    fn recording_registry() -> (WindowRegistry, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let registry = registry_with(recording_catalog(&log), Rc::new(ManualTimerService::new()));
        (registry, log)
    }

    fn open(registry: &mut WindowRegistry, app: &str) -> WindowId {
        registry
            .open(OpenWindowRequest::new(ApplicationId::trusted(app)))
            .window_id()
    }

    fn window<'a>(registry: &'a WindowRegistry, id: WindowId) -> &'a Window {
        registry.get(id).expect("window exists")
    }

    #[test]
    fn repeated_open_keeps_a_single_focused_window() {
        let (mut registry, log) = recording_registry();

        let first = registry.open(OpenWindowRequest::new(ApplicationId::trusted("excel")));
        assert!(matches!(first, OpenOutcome::Created(_)));
        let mut last_order = window(&registry, first.window_id()).stack_order;

        for _ in 0..3 {
            let again = registry.open(OpenWindowRequest::new(ApplicationId::trusted("excel")));
            assert_eq!(again, OpenOutcome::Focused(first.window_id()));
            assert_eq!(registry.focused(), Some(first.window_id()));
            let order = window(&registry, first.window_id()).stack_order;
            assert!(order > last_order);
            last_order = order;
        }

        assert_eq!(registry.len(), 1);
        assert_eq!(
            log.borrow().iter().filter(|e| *e == "excel:mount").count(),
            1
        );
    }

    #[test]
    fn reopening_raises_the_existing_window_above_others() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        assert_eq!(open(&mut registry, "excel"), excel);

        assert_eq!(registry.len(), 2);
        assert!(window(&registry, excel).stack_order > window(&registry, word).stack_order);
        assert_eq!(registry.focused(), Some(excel));
    }

    #[test]
    fn stacking_orders_strictly_increase_and_stay_unique() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        let ppt = open(&mut registry, "ppt");

        let mut issued = vec![registry.last_stack_order()];
        for step in [excel, ppt, word, excel] {
            registry.focus(step);
            issued.push(registry.last_stack_order());
        }
        registry.minimize(excel);
        issued.push(registry.last_stack_order());

        assert!(issued.windows(2).all(|pair| pair[0] < pair[1]));
        let mut orders: Vec<u64> = registry
            .windows_in_paint_order()
            .iter()
            .map(|w| w.stack_order)
            .collect();
        orders.dedup();
        assert_eq!(orders.len(), registry.len());
    }

    #[test]
    fn closing_focused_window_hands_focus_to_next_highest() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        let ppt = open(&mut registry, "ppt");
        registry.focus(excel);
        registry.focus(ppt);

        assert!(registry.close(ppt));
        assert_eq!(registry.focused(), Some(excel));
        assert!(registry.close(excel));
        assert_eq!(registry.focused(), Some(word));
        assert!(registry.close(word));
        assert_eq!(registry.focused(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn closing_focused_window_raises_a_minimized_window_that_outranks_the_rest() {
        let (mut registry, log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        let ppt = open(&mut registry, "ppt");
        registry.focus(excel);
        registry.minimize(ppt);
        assert_eq!(registry.focused(), Some(excel));

        assert!(registry.close(excel));

        assert_eq!(registry.focused(), Some(ppt));
        let focused = window(&registry, ppt);
        assert!(!focused.minimized);
        assert_eq!(focused.stack_order, registry.last_stack_order());
        assert!(focused.stack_order > window(&registry, word).stack_order);
        assert_eq!(log.borrow().last().map(String::as_str), Some("ppt:focused"));
    }

    #[test]
    fn closing_focused_window_raises_the_next_window_to_the_top() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        registry.focus(excel);

        registry.close(excel);

        assert_eq!(registry.focused(), Some(word));
        assert_eq!(window(&registry, word).stack_order, registry.last_stack_order());
    }

    #[test]
    fn focus_hand_off_on_close_plays_the_focus_cue() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sound = RecordingSoundService::default();
        let mut registry = WindowRegistry::new(
            Rc::new(recording_catalog(&log)),
            CascadeConfig::default(),
            HostServices::new(Rc::new(ManualTimerService::new()), Rc::new(sound.clone())),
            AppCommandSink::default(),
        );
        open(&mut registry, "excel");
        let word = open(&mut registry, "word");

        registry.close(word);

        assert_eq!(
            sound.events()[2..].to_vec(),
            vec![
                SoundEvent::Play(SoundCue::WindowClose),
                SoundEvent::Play(SoundCue::Focus),
            ]
        );
    }

    #[test]
    fn closing_unfocused_window_keeps_focus() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");

        registry.close(excel);
        assert_eq!(registry.focused(), Some(word));
    }

    #[test]
    fn minimize_preserves_geometry_and_focus_restores_it() {
        let (mut registry, log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        registry.move_to(word, -40, 900);
        let rect = window(&registry, word).rect;

        assert!(registry.minimize(word));
        assert!(window(&registry, word).minimized);
        assert_eq!(window(&registry, word).rect, rect);
        assert_eq!(registry.focused(), Some(excel));

        assert!(registry.focus(word));
        assert!(!window(&registry, word).minimized);
        assert_eq!(window(&registry, word).rect, rect);
        assert_eq!(registry.focused(), Some(word));
        assert!(log.borrow().contains(&"word:restored".to_string()));
        assert!(!log.borrow().contains(&"word:teardown".to_string()));
    }

    #[test]
    fn minimizing_the_only_window_clears_focus() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        registry.minimize(excel);
        assert_eq!(registry.focused(), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn new_windows_cascade_from_the_live_window_count() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        let positions = |r: &WindowRegistry, id| {
            let rect = window(r, id).rect;
            (rect.x, rect.y)
        };
        assert_eq!(positions(&registry, excel), (50, 50));
        assert_eq!(positions(&registry, word), (80, 80));

        registry.close(excel);
        let ppt = open(&mut registry, "ppt");
        assert_eq!(positions(&registry, ppt), (80, 80));
        assert_eq!((window(&registry, ppt).rect.w, window(&registry, ppt).rect.h), (900, 600));
    }

    #[test]
    fn window_ids_are_never_reused() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        registry.close(excel);
        let excel_again = open(&mut registry, "excel");
        assert!(excel_again > excel);
    }

    #[test]
    fn apps_mount_once_and_tear_down_once() {
        let (mut registry, log) = recording_registry();
        let excel = open(&mut registry, "excel");
        registry.minimize(excel);
        registry.focus(excel);
        open(&mut registry, "excel");

        assert!(registry.close(excel));
        assert!(!registry.close(excel));
        assert!(!registry.focus(excel));
        assert!(!registry.minimize(excel));

        let log = log.borrow();
        assert_eq!(log.iter().filter(|e| *e == "excel:mount").count(), 1);
        assert_eq!(log.iter().filter(|e| *e == "excel:teardown").count(), 1);
        assert_eq!(log.last().map(String::as_str), Some("excel:teardown"));
    }

    #[test]
    fn closing_a_window_stops_its_app_timers() {
        let timers = Rc::new(ManualTimerService::new());
        let ticks = Rc::new(Cell::new(0u64));
        let mut catalog = AppCatalog::from_config(&DesktopConfig::default());
        let counter = Rc::clone(&ticks);
        let snake = catalog.resolve(&ApplicationId::trusted("snake"));
        catalog.insert(AppDescriptor {
            factory: Rc::new(move || {
                Box::new(ArcadeApp::with_tick_counter(Rc::clone(&counter))) as Box<dyn AppHost>
            }),
            ..snake
        });
        let mut registry = registry_with(catalog, timers.clone());

        let snake = open(&mut registry, "snake");
        timers.advance(Duration::from_millis(ARCADE_TICK_MS * 3));
        assert_eq!(ticks.get(), 3);

        registry.close(snake);
        timers.advance(Duration::from_millis(ARCADE_TICK_MS * 10));
        assert_eq!(ticks.get(), 3);
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn hit_test_prefers_topmost_visible_window() {
        let (mut registry, _log) = recording_registry();
        let excel = open(&mut registry, "excel");
        let word = open(&mut registry, "word");
        let point = PointerPosition { x: 100, y: 100 };

        assert_eq!(registry.hit_test(point), Some(word));
        registry.focus(excel);
        assert_eq!(registry.hit_test(point), Some(excel));
        registry.minimize(excel);
        assert_eq!(registry.hit_test(point), Some(word));
        assert_eq!(registry.hit_test(PointerPosition { x: 10, y: 10 }), None);
    }

    #[test]
    fn close_all_tears_every_app_down() {
        let (mut registry, log) = recording_registry();
        open(&mut registry, "excel");
        open(&mut registry, "word");

        assert_eq!(registry.close_all(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.focused(), None);
        let log = log.borrow();
        assert!(log.contains(&"excel:teardown".to_string()));
        assert!(log.contains(&"word:teardown".to_string()));
    }
}
