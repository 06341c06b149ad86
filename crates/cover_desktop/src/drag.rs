//! Title-bar drag gestures.

use thiserror::Error;

use crate::{
    model::{DragSession, PointerPosition, PointerTarget, WindowId},
    window_manager::WindowRegistry,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
/// Rejected drag start.
pub enum DragError {
    /// The pointer-down did not land on a title bar.
    #[error("pointer-down on {0:?} does not start a drag")]
    NotDraggable(PointerTarget),
    /// A gesture is already in progress.
    #[error("window {0:?} is already being dragged")]
    AlreadyDragging(WindowId),
    /// The target window does not exist.
    #[error("window {0:?} not found")]
    WindowNotFound(WindowId),
}

/// Holds the single in-flight [`DragSession`] and applies pointer deltas through the registry.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts dragging `window_id` and brings it to the front.
    ///
    /// # Errors
    ///
    /// Returns [`DragError`] when the pointer missed the title bar, when another gesture is
    /// active, or when the window is gone. Nothing changes on error.
    pub fn begin(
        &mut self,
        registry: &mut WindowRegistry,
        window_id: WindowId,
        target: PointerTarget,
        pointer: PointerPosition,
    ) -> Result<(), DragError> {
        if target != PointerTarget::TitleBar {
            return Err(DragError::NotDraggable(target));
        }
        if let Some(active) = self.session {
            return Err(DragError::AlreadyDragging(active.window_id));
        }
        let rect_start = registry
            .get(window_id)
            .map(|window| window.rect)
            .ok_or(DragError::WindowNotFound(window_id))?;

        registry.focus(window_id);
        registry.set_dragging(window_id, true);
        self.session = Some(DragSession {
            window_id,
            pointer_start: pointer,
            rect_start,
        });
        Ok(())
    }

    /// Moves the dragged window to its start position plus the pointer's total travel.
    ///
    /// Returns `false` when no gesture is active. A gesture whose window vanished is dropped.
    pub fn update(&mut self, registry: &mut WindowRegistry, pointer: PointerPosition) -> bool {
        let Some(session) = self.session else {
            return false;
        };
        let rect = session.rect_start.offset(
            pointer.x - session.pointer_start.x,
            pointer.y - session.pointer_start.y,
        );
        if registry.move_to(session.window_id, rect.x, rect.y) {
            true
        } else {
            self.session = None;
            false
        }
    }

    /// Ends the gesture wherever the pointer is. A pointer-up without a gesture is ignored.
    pub fn end(&mut self, registry: &mut WindowRegistry) -> Option<WindowId> {
        let session = self.session.take()?;
        registry.set_dragging(session.window_id, false);
        Some(session.window_id)
    }

    /// Drops the gesture if it targets `window_id`. Called before the window is closed.
    pub fn invalidate_window(&mut self, window_id: WindowId) {
        if self.dragged_window() == Some(window_id) {
            self.session = None;
        }
    }

    /// Drops any gesture without touching windows.
    pub fn reset(&mut self) {
        self.session = None;
    }

    pub fn active(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn dragged_window(&self) -> Option<WindowId> {
        self.session.map(|session| session.window_id)
    }
}
