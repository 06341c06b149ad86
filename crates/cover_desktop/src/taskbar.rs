//! Read-side projections of the registry for the taskbar and dock.

use cover_app_contract::ApplicationId;
use serde::{Deserialize, Serialize};

use crate::{
    model::{OpenOutcome, OpenWindowRequest, Window, WindowId},
    window_manager::WindowRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorState {
    Focused,
    Running,
    Minimized,
}

impl IndicatorState {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::Running => "running",
            Self::Minimized => "minimized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One running app as shown on the taskbar.
pub struct TaskbarIndicator {
    pub app_id: ApplicationId,
    pub window_id: WindowId,
    pub title: String,
    pub icon: String,
    pub state: IndicatorState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Launcher slot: a pinned app, or an unpinned app that is currently running.
pub struct DockEntry {
    pub app_id: ApplicationId,
    pub title: String,
    pub icon: String,
    pub pinned: bool,
    /// Present while the app has a live window.
    pub indicator: Option<IndicatorState>,
}

fn indicator_state(registry: &WindowRegistry, window: &Window) -> IndicatorState {
    if window.minimized {
        IndicatorState::Minimized
    } else if registry.focused() == Some(window.id) {
        IndicatorState::Focused
    } else {
        IndicatorState::Running
    }
}

/// One indicator per running app, in the order the apps were opened.
pub fn project_taskbar(registry: &WindowRegistry) -> Vec<TaskbarIndicator> {
    registry
        .windows_in_open_order()
        .into_iter()
        .map(|window| TaskbarIndicator {
            app_id: window.app_id.clone(),
            window_id: window.id,
            title: window.title.clone(),
            icon: window.icon.clone(),
            state: indicator_state(registry, window),
        })
        .collect()
}

/// Pinned catalog apps in catalog order, followed by running apps that are not pinned.
pub fn project_dock(registry: &WindowRegistry) -> Vec<DockEntry> {
    let catalog = registry.catalog();
    let mut dock: Vec<DockEntry> = catalog
        .pinned()
        .map(|descriptor| DockEntry {
            app_id: descriptor.app_id.clone(),
            title: descriptor.title.clone(),
            icon: descriptor.icon.clone(),
            pinned: true,
            indicator: registry
                .window_for_app(&descriptor.app_id)
                .map(|window| indicator_state(registry, window)),
        })
        .collect();

    for window in registry.windows_in_open_order() {
        let pinned = catalog
            .get(&window.app_id)
            .is_some_and(|descriptor| descriptor.pinned);
        if !pinned {
            dock.push(DockEntry {
                app_id: window.app_id.clone(),
                title: window.title.clone(),
                icon: window.icon.clone(),
                pinned: false,
                indicator: Some(indicator_state(registry, window)),
            });
        }
    }
    dock
}

/// Taskbar or dock click: focuses or restores a running app, or launches it.
pub fn activate_indicator(registry: &mut WindowRegistry, app_id: &ApplicationId) -> OpenOutcome {
    registry.open(OpenWindowRequest::new(app_id.clone()))
}
