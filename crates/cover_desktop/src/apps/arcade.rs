use std::{cell::Cell, rc::Rc, time::Duration};

use cover_app_contract::{AppHost, AppInput, AppLifecycleEvent, AppMountContext, AppServices};
use cover_host::TimerId;

/// Tick period of the arcade loop.
pub const ARCADE_TICK_MS: u64 = 100;

/// Placeholder arcade minigame: a tick loop running on the window's scoped timers.
#[derive(Debug, Default)]
pub struct ArcadeApp {
    services: Option<AppServices>,
    ticks: Rc<Cell<u64>>,
    tick_timer: Option<TimerId>,
    paused: bool,
}

impl ArcadeApp {
    /// Creates an app that reports its ticks through `ticks`.
    pub fn with_tick_counter(ticks: Rc<Cell<u64>>) -> Self {
        Self {
            ticks,
            ..Self::default()
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    fn start(&mut self) {
        if self.tick_timer.is_some() || self.paused {
            return;
        }
        let Some(services) = self.services.as_ref() else {
            return;
        };
        let ticks = Rc::clone(&self.ticks);
        self.tick_timer = Some(services.timers.set_interval(
            Duration::from_millis(ARCADE_TICK_MS),
            Rc::new(move || ticks.set(ticks.get() + 1)),
        ));
    }

    fn stop(&mut self) {
        if let (Some(id), Some(services)) = (self.tick_timer.take(), self.services.as_ref()) {
            services.timers.clear(id);
        }
    }
}

impl AppHost for ArcadeApp {
    fn mount(&mut self, ctx: AppMountContext) {
        self.services = Some(ctx.services);
        self.start();
    }

    fn teardown(&mut self) {
        self.stop();
    }

    fn on_lifecycle(&mut self, event: AppLifecycleEvent) {
        match event {
            AppLifecycleEvent::Suspended => self.stop(),
            AppLifecycleEvent::Resumed => self.start(),
            _ => {}
        }
    }

    fn handle_input(&mut self, input: &AppInput) {
        if matches!(input, AppInput::Key(key) if key == " ") {
            self.paused = !self.paused;
            if self.paused {
                self.stop();
            } else {
                self.start();
            }
        }
    }
}
