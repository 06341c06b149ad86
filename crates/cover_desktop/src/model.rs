use cover_app_contract::{ApplicationId, ContentRegion, TITLE_BAR_HEIGHT};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_WIDTH: i32 = 600;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Boot,
    Login,
    Desktop,
    Crashed,
}

impl SessionState {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Login => "login",
            Self::Desktop => "desktop",
            Self::Crashed => "crashed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn contains(self, point: PointerPosition) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.w
            && point.y < self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

/// Part of a window a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// Title bar, outside any control: starts a drag.
    TitleBar,
    /// Close/minimize affordance: handled by the control itself.
    Control,
    /// App content: focuses the window.
    Content,
}

/// A positioned, sized, stacked region hosting one app instance.
///
/// Owned by [`crate::window_manager::WindowRegistry`]; everyone else reads clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub id: WindowId,
    pub app_id: ApplicationId,
    pub title: String,
    pub icon: String,
    pub rect: WindowRect,
    pub stack_order: u64,
    pub minimized: bool,
    pub dragging: bool,
}

impl Window {
    pub fn content_region(&self) -> ContentRegion {
        ContentRegion {
            window_id: self.id.0,
            x: self.rect.x,
            y: self.rect.y + TITLE_BAR_HEIGHT,
            width: self.rect.w,
            height: (self.rect.h - TITLE_BAR_HEIGHT).max(0),
        }
    }
}

/// Initial configuration for [`crate::window_manager::WindowRegistry::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenWindowRequest {
    pub app_id: ApplicationId,
    pub title: Option<String>,
    pub rect: Option<WindowRect>,
}

impl OpenWindowRequest {
    pub fn new(app_id: ApplicationId) -> Self {
        Self {
            app_id,
            title: None,
            rect: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// A new window was created and mounted.
    Created(WindowId),
    /// The app already had a window; it was focused instead.
    Focused(WindowId),
}

impl OpenOutcome {
    pub fn window_id(self) -> WindowId {
        match self {
            Self::Created(id) | Self::Focused(id) => id,
        }
    }
}

/// In-progress drag gesture. At most one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}
