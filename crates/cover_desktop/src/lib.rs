//! Desktop session and window manager for the cover desktop: a simulated office OS summoned
//! over the game.
//!
//! [`SessionController`] drives boot, login, desktop and crash. On the desktop it owns a
//! [`WindowRegistry`] (windows, stacking order, focus) and a [`DragController`]. The taskbar and
//! dock are projections of the registry. [`DesktopRuntime`] shares one session between the host
//! and the Leptos view layer in [`components`].

pub mod apps;
pub mod components;
pub mod config;
pub mod drag;
pub mod host;
pub mod model;
pub mod reducer;
pub mod runtime;
pub mod session;
pub mod taskbar;
pub mod window_manager;

pub use apps::{AppCatalog, AppDescriptor};
pub use components::{use_desktop_runtime, DesktopProvider, DesktopRuntimeContext, DesktopShell};
pub use config::{ConfigError, DesktopConfig, DesktopSkin};
pub use drag::{DragController, DragError};
pub use host::{BrowserTimerService, LoggingSoundService};
pub use model::*;
pub use reducer::DesktopAction;
pub use runtime::{DesktopRuntime, SessionSnapshot};
pub use session::{LoginOutcome, SessionController, SessionError};
pub use taskbar::{
    activate_indicator, project_dock, project_taskbar, DockEntry, IndicatorState, TaskbarIndicator,
};
pub use window_manager::WindowRegistry;
