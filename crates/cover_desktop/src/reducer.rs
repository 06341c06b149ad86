//! Actions accepted by the session and their dispatch.

use cover_app_contract::{AppInput, ApplicationId};

use crate::{
    model::{PointerPosition, PointerTarget, WindowId},
    session::{SessionController, SessionError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Actions accepted by [`SessionController::dispatch`].
pub enum DesktopAction {
    /// Show the session (host panic key).
    Activate,
    /// Hide the session.
    Deactivate,
    /// Submit the login form.
    SubmitCredentials {
        /// Raw input from the password field.
        input: String,
    },
    /// Simulated system failure.
    Crash,
    /// Reboot from the crash screen.
    AcknowledgeCrash,
    /// Open an app, or focus it when already running.
    OpenApp {
        /// App to open.
        app_id: ApplicationId,
    },
    /// Taskbar or dock click.
    ActivateIndicator {
        /// App behind the indicator.
        app_id: ApplicationId,
    },
    /// Focus (and raise) a window.
    FocusWindow {
        /// Window to focus.
        window_id: WindowId,
    },
    /// Minimize a window.
    MinimizeWindow {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Close a window.
    CloseWindow {
        /// Window to close.
        window_id: WindowId,
    },
    /// Pointer pressed on a window.
    PointerDown {
        /// Window under the pointer.
        window_id: WindowId,
        /// Part of the window that was hit.
        target: PointerTarget,
        /// Pointer position.
        pointer: PointerPosition,
    },
    /// Pointer moved.
    PointerMove {
        /// Current pointer position.
        pointer: PointerPosition,
    },
    /// Pointer released.
    PointerUp,
    /// Input for a window's app.
    AppInput {
        /// Window receiving the input.
        window_id: WindowId,
        /// The input itself.
        input: AppInput,
    },
    /// Close the assistant bubble.
    DismissAssistant,
}

impl SessionController {
    /// Applies an action, then any app commands it produced.
    ///
    /// Operations on windows that no longer exist succeed as no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the action does not apply to the current session state.
    pub fn dispatch(&mut self, action: DesktopAction) -> Result<(), SessionError> {
        let result = match action {
            DesktopAction::Activate => {
                self.activate();
                Ok(())
            }
            DesktopAction::Deactivate => {
                self.deactivate();
                Ok(())
            }
            DesktopAction::SubmitCredentials { input } => {
                self.submit_credentials(&input).map(|_| ())
            }
            DesktopAction::Crash => self.crash(),
            DesktopAction::AcknowledgeCrash => self.acknowledge_crash(),
            DesktopAction::OpenApp { app_id } => self.open_app(app_id).map(|_| ()),
            DesktopAction::ActivateIndicator { app_id } => {
                self.activate_indicator(&app_id).map(|_| ())
            }
            DesktopAction::FocusWindow { window_id } => self.focus_window(window_id).map(|_| ()),
            DesktopAction::MinimizeWindow { window_id } => {
                self.minimize_window(window_id).map(|_| ())
            }
            DesktopAction::CloseWindow { window_id } => self.close_window(window_id).map(|_| ()),
            DesktopAction::PointerDown {
                window_id,
                target,
                pointer,
            } => self.pointer_down(window_id, target, pointer),
            DesktopAction::PointerMove { pointer } => {
                self.pointer_move(pointer);
                Ok(())
            }
            DesktopAction::PointerUp => {
                self.pointer_up();
                Ok(())
            }
            DesktopAction::AppInput { window_id, input } => {
                self.app_input(window_id, &input).map(|_| ())
            }
            DesktopAction::DismissAssistant => {
                self.dismiss_assistant();
                Ok(())
            }
        };
        self.drain_app_commands();
        result
    }
}
