//! Leptos view layer. Views read [`SessionSnapshot`] and write only through dispatch.

mod taskbar;
mod window;

use std::rc::Rc;

use cover_host::{HostServices, SoundService};
use leptos::*;

use self::{taskbar::Taskbar, window::DesktopWindow};
use crate::{
    config::DesktopConfig,
    host::{BrowserTimerService, LoggingSoundService},
    model::{PointerPosition, SessionState, WindowId},
    reducer::DesktopAction,
    runtime::{DesktopRuntime, SessionSnapshot},
    session::SessionController,
};

#[derive(Clone, Copy)]
/// Leptos context for reading the session snapshot and dispatching [`DesktopAction`] values.
pub struct DesktopRuntimeContext {
    /// Shared session handle.
    pub runtime: StoredValue<DesktopRuntime>,
    /// Latest snapshot, refreshed after every change.
    pub snapshot: RwSignal<SessionSnapshot>,
}

impl DesktopRuntimeContext {
    /// Dispatches an action. Rejections are logged by the runtime.
    pub fn dispatch_action(&self, action: DesktopAction) {
        let runtime = self.runtime.get_value();
        runtime.dispatch(action);
    }
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components.
pub fn DesktopProvider(
    /// Session configuration; defaults when omitted.
    #[prop(optional)]
    config: Option<DesktopConfig>,
    /// Host sound collaborator; logs cues when omitted.
    #[prop(optional)]
    sound: Option<Rc<dyn SoundService>>,
    /// Activate the session as soon as the provider mounts.
    #[prop(optional)]
    activate_on_mount: bool,
    children: Children,
) -> impl IntoView {
    let sound = sound.unwrap_or_else(|| Rc::new(LoggingSoundService));
    let host = HostServices::new(Rc::new(BrowserTimerService::new()), sound);
    let runtime = DesktopRuntime::new(SessionController::new(config.unwrap_or_default(), host));

    let snapshot = create_rw_signal(runtime.snapshot());
    runtime.subscribe(move |next| snapshot.set(next.clone()));

    let teardown = runtime.clone();
    on_cleanup(move || {
        teardown.deactivate();
    });

    let context = DesktopRuntimeContext {
        runtime: store_value(runtime),
        snapshot,
    };
    provide_context(context);

    if activate_on_mount {
        context.dispatch_action(DesktopAction::Activate);
    }

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}

fn pointer_from_pointer_event(ev: &web_sys::PointerEvent) -> PointerPosition {
    PointerPosition {
        x: ev.client_x(),
        y: ev.client_y(),
    }
}

#[component]
/// Renders the active session: boot, login, desktop or crash screen. Renders nothing while
/// the session is inactive.
pub fn DesktopShell() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let snapshot = runtime.snapshot;
    let active = create_memo(move |_| snapshot.with(|s| s.active));
    let state = create_memo(move |_| snapshot.with(|s| s.state));
    let skin = create_memo(move |_| snapshot.with(|s| s.skin));

    let key_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() || ev.key() != "Escape" {
            return;
        }
        if active.get_untracked() && state.get_untracked() == SessionState::Crashed {
            ev.prevent_default();
            runtime.dispatch_action(DesktopAction::AcknowledgeCrash);
        }
    });
    on_cleanup(move || key_listener.remove());

    let move_listener = window_event_listener(ev::pointermove, move |ev| {
        if snapshot.with_untracked(|s| s.dragging.is_some()) {
            runtime.dispatch_action(DesktopAction::PointerMove {
                pointer: pointer_from_pointer_event(&ev),
            });
        }
    });
    on_cleanup(move || move_listener.remove());

    let up_listener = window_event_listener(ev::pointerup, move |_| {
        if snapshot.with_untracked(|s| s.dragging.is_some()) {
            runtime.dispatch_action(DesktopAction::PointerUp);
        }
    });
    on_cleanup(move || up_listener.remove());

    view! {
        <Show when=move || active.get() fallback=|| ()>
            <div
                id="cover-desktop-root"
                class=move || format!("cover-desktop skin-{}", skin.get().as_str())
                data-state=move || state.get().token()
            >
                {move || match state.get() {
                    SessionState::Boot => view! { <BootScreen /> }.into_view(),
                    SessionState::Login => view! { <LoginScreen /> }.into_view(),
                    SessionState::Desktop => view! { <DesktopScreen /> }.into_view(),
                    SessionState::Crashed => view! { <CrashScreen /> }.into_view(),
                }}
            </div>
        </Show>
    }
}

#[component]
fn BootScreen() -> impl IntoView {
    view! {
        <div class="boot-screen" aria-busy="true">
            <div class="boot-logo" aria-hidden="true"></div>
            <div class="boot-spinner" aria-hidden="true"></div>
            <p>"Starting Windows"</p>
        </div>
    }
}

#[component]
fn LoginScreen() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let password = create_rw_signal(String::new());

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let input = password.get_untracked();
        password.set(String::new());
        runtime.dispatch_action(DesktopAction::SubmitCredentials { input });
    };

    view! {
        <div class="login-screen">
            <div class="login-avatar" aria-hidden="true"></div>
            <h1 class="login-user">"John Doe"</h1>
            <form class="login-form" on:submit=submit>
                <input
                    type="password"
                    placeholder="PIN"
                    autocomplete="off"
                    aria-label="PIN"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <button type="submit" aria-label="Sign in">"→"</button>
            </form>
            <button
                class="login-power"
                aria-label="Shut down"
                on:click=move |_| runtime.dispatch_action(DesktopAction::Deactivate)
            >
                "⏻"
            </button>
        </div>
    }
}

#[component]
fn CrashScreen() -> impl IntoView {
    let runtime = use_desktop_runtime();
    view! {
        <div
            class="crash-screen"
            role="alert"
            on:click=move |_| runtime.dispatch_action(DesktopAction::AcknowledgeCrash)
        >
            <p class="crash-face">":("</p>
            <p>
                "Your PC ran into a problem and needs to restart. We're just collecting some error info, and then we'll restart for you."
            </p>
            <p class="crash-code">"Stop code: CRITICAL_PROCESS_DIED"</p>
            <p class="crash-hint">"Press Esc or click anywhere to restart"</p>
        </div>
    }
}

#[component]
fn DesktopScreen() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let window_ids = create_memo(move |_| {
        let mut ids: Vec<WindowId> = runtime
            .snapshot
            .with(|s| s.windows.iter().map(|w| w.id).collect());
        ids.sort();
        ids
    });

    view! {
        <div class="desktop-surface">
            <div class="window-layer">
                <For each=move || window_ids.get() key=|id| id.0 let:window_id>
                    <DesktopWindow window_id=window_id />
                </For>
            </div>
            <AssistantBubble />
            <Taskbar />
        </div>
    }
}

#[component]
fn AssistantBubble() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let tip = create_memo(move |_| runtime.snapshot.with(|s| s.assistant_tip.clone()));

    view! {
        <Show when=move || tip.with(Option::is_some) fallback=|| ()>
            <aside class="assistant" role="status">
                <div class="assistant-avatar" aria-hidden="true"></div>
                <div class="assistant-bubble">
                    <p>{move || tip.get().unwrap_or_default()}</p>
                    <button
                        aria-label="Dismiss tip"
                        on:click=move |_| runtime.dispatch_action(DesktopAction::DismissAssistant)
                    >
                        "×"
                    </button>
                </div>
            </aside>
        </Show>
    }
}
