//! Shared contract between the cover desktop window manager and the apps it hosts.
//!
//! The window manager stays opaque to app internals: an app receives a [`ContentRegion`] and an
//! [`AppServices`] handle when it is mounted, renders and binds input inside that region, and
//! talks back to the session only through [`AppCommand`]s. Nothing crosses this boundary through
//! the window record itself.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use cover_host::{ScopedTimers, SoundCue, SoundService};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identifier for a runtime-managed window, as seen by apps.
pub type WindowRuntimeId = u64;

/// Height of the window chrome above an app's content region.
pub const TITLE_BAR_HEIGHT: i32 = 32;

/// Stable identifier for a hosted application (`"excel"`, `"terminal"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid application id `{0}`; expected lowercase segments separated by dots")]
/// Rejected application identifier.
pub struct InvalidApplicationId(pub String);

impl ApplicationId {
    /// Returns an app identifier when `raw` is one or more `[a-z][a-z0-9-]*` segments joined by
    /// dots.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidApplicationId`] for empty, overlong, or malformed ids.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidApplicationId> {
        let raw = raw.into();
        if is_valid_application_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidApplicationId(raw))
        }
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ApplicationId {
    type Error = InvalidApplicationId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<ApplicationId> for String {
    fn from(id: ApplicationId) -> Self {
        id.0
    }
}

fn is_valid_application_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 64 {
        return false;
    }

    raw.split('.').all(|part| {
        let bytes = part.as_bytes();
        !bytes.is_empty()
            && bytes[0].is_ascii_lowercase()
            && !part.ends_with('-')
            && bytes
                .iter()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
    })
}

/// Rectangle handed to an app at mount time: whatever remains under the title bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRegion {
    /// Window that owns the region.
    pub window_id: WindowRuntimeId,
    /// Left edge in desktop coordinates.
    pub x: i32,
    /// Top edge in desktop coordinates.
    pub y: i32,
    /// Region width.
    pub width: i32,
    /// Region height.
    pub height: i32,
}

impl ContentRegion {
    /// DOM id of the element the view layer renders for this region.
    pub fn container_id(&self) -> String {
        format!("win-content-{}", self.window_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle notifications delivered after mount and before teardown.
pub enum AppLifecycleEvent {
    /// Window became focused.
    Focused,
    /// Window was minimized.
    Minimized,
    /// Window was restored from minimized.
    Restored,
    /// Session deactivated; the window's timers were already cleared.
    Suspended,
    /// Session reactivated after a suspension.
    Resumed,
}

impl AppLifecycleEvent {
    /// Returns a stable string token for debugging hooks.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Minimized => "minimized",
            Self::Restored => "restored",
            Self::Suspended => "suspended",
            Self::Resumed => "resumed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Input routed by the window manager to the app owning a window.
pub enum AppInput {
    /// A single key press (`"ArrowUp"`, `"a"`, ...).
    Key(String),
    /// A submitted line of text (terminal command, formula bar, ...).
    Submit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Requests an app may send to the session.
pub enum AppCommand {
    /// Close the app's own window.
    CloseWindow,
    /// Crash the simulated system.
    RequestCrash,
    /// Open (or focus) another app.
    OpenApp(ApplicationId),
    /// Replace the app's window title.
    SetTitle(String),
}

#[derive(Debug, Clone, Default)]
/// Queue of app commands, drained by the session after each operation.
pub struct AppCommandSink {
    queue: Rc<RefCell<VecDeque<(WindowRuntimeId, AppCommand)>>>,
}

impl AppCommandSink {
    /// Queues `command` on behalf of `window_id`.
    pub fn push(&self, window_id: WindowRuntimeId, command: AppCommand) {
        self.queue.borrow_mut().push_back((window_id, command));
    }

    /// Removes and returns the oldest queued command.
    pub fn pop(&self) -> Option<(WindowRuntimeId, AppCommand)> {
        self.queue.borrow_mut().pop_front()
    }

    /// Drops every queued command.
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Returns whether no command is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[derive(Clone)]
/// Services injected into a mounted app.
pub struct AppServices {
    /// Window the app is mounted in.
    pub window_id: WindowRuntimeId,
    /// Timers owned by this window. The window manager clears them on suspend and close.
    pub timers: ScopedTimers,
    sound: Rc<dyn SoundService>,
    commands: AppCommandSink,
}

impl AppServices {
    /// Creates an app service handle.
    pub fn new(
        window_id: WindowRuntimeId,
        timers: ScopedTimers,
        sound: Rc<dyn SoundService>,
        commands: AppCommandSink,
    ) -> Self {
        Self {
            window_id,
            timers,
            sound,
            commands,
        }
    }

    /// Sends a command to the session on behalf of this window.
    pub fn send(&self, command: AppCommand) {
        self.commands.push(self.window_id, command);
    }

    /// Plays a sound cue through the host sound collaborator.
    pub fn play(&self, cue: SoundCue) {
        self.sound.play(cue);
    }
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("window_id", &self.window_id)
            .field("timers", &self.timers.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
/// Everything an app receives at mount time.
pub struct AppMountContext {
    /// Application being mounted.
    pub app_id: ApplicationId,
    /// Region under the title bar.
    pub region: ContentRegion,
    /// Injected services.
    pub services: AppServices,
}

/// Interface every hosted mini-application implements.
pub trait AppHost {
    /// Called exactly once, when the app's window is created.
    fn mount(&mut self, ctx: AppMountContext);

    /// Called exactly once, when the window is closed or the session tears down.
    ///
    /// Releases whatever the app created itself. Timers created through
    /// [`AppServices::timers`] are cleared by the window manager regardless.
    fn teardown(&mut self) {}

    /// Lifecycle notification between mount and teardown.
    fn on_lifecycle(&mut self, _event: AppLifecycleEvent) {}

    /// Input routed to this app's window.
    fn handle_input(&mut self, _input: &AppInput) {}
}

/// Constructor for a fresh app instance.
pub type AppFactory = Rc<dyn Fn() -> Box<dyn AppHost>>;
