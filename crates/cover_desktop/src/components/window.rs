use super::*;
use crate::model::{PointerTarget, Window};
use cover_app_contract::AppInput;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

#[cfg(target_arch = "wasm32")]
fn try_set_pointer_capture(ev: &web_sys::PointerEvent) {
    if let Some(target) = ev.current_target() {
        if let Ok(element) = target.dyn_into::<web_sys::Element>() {
            let _ = element.set_pointer_capture(ev.pointer_id());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn try_set_pointer_capture(_: &web_sys::PointerEvent) {}

fn window_style(window: &Window) -> String {
    format!(
        "left:{}px;top:{}px;width:{}px;height:{}px;z-index:{};",
        window.rect.x, window.rect.y, window.rect.w, window.rect.h, window.stack_order
    )
}

fn stop_pointer(ev: web_sys::PointerEvent) {
    ev.stop_propagation();
}

#[component]
pub(super) fn DesktopWindow(window_id: WindowId) -> impl IntoView {
    let runtime = use_desktop_runtime();

    let window = create_memo(move |_| {
        runtime
            .snapshot
            .with(|s| s.windows.iter().find(|w| w.id == window_id).cloned())
    });
    let focused = create_memo(move |_| runtime.snapshot.with(|s| s.focused == Some(window_id)));

    // Built once and patched through reactive attributes: the content element must outlive
    // every snapshot change.
    let container_id = window
        .get_untracked()
        .map(|w| w.content_region().container_id())
        .unwrap_or_default();

    let begin_move = move |ev: web_sys::PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        try_set_pointer_capture(&ev);
        ev.prevent_default();
        ev.stop_propagation();
        runtime.dispatch_action(DesktopAction::PointerDown {
            window_id,
            target: PointerTarget::TitleBar,
            pointer: pointer_from_pointer_event(&ev),
        });
    };
    let focus = move |ev: web_sys::PointerEvent| {
        if focused.get_untracked() {
            return;
        }
        runtime.dispatch_action(DesktopAction::PointerDown {
            window_id,
            target: PointerTarget::Content,
            pointer: pointer_from_pointer_event(&ev),
        });
    };
    let forward_key = move |ev: web_sys::KeyboardEvent| {
        if ev.default_prevented() {
            return;
        }
        runtime.dispatch_action(DesktopAction::AppInput {
            window_id,
            input: AppInput::Key(ev.key()),
        });
    };

    view! {
        <section
            class=move || {
                let mut class = String::from("desktop-window");
                if focused.get() {
                    class.push_str(" focused");
                }
                if window.with(|w| w.as_ref().is_some_and(|w| w.minimized)) {
                    class.push_str(" minimized");
                }
                if window.with(|w| w.as_ref().is_some_and(|w| w.dragging)) {
                    class.push_str(" dragging");
                }
                class
            }
            style=move || window.with(|w| w.as_ref().map(window_style).unwrap_or_default())
            role="dialog"
            aria-label=move || window.with(|w| w.as_ref().map(|w| w.title.clone()).unwrap_or_default())
            on:pointerdown=focus
        >
            <header class="titlebar" on:pointerdown=begin_move>
                <span
                    class="titlebar-icon"
                    data-icon=move || window.with(|w| w.as_ref().map(|w| w.icon.clone()).unwrap_or_default())
                    aria-hidden="true"
                ></span>
                <span class="titlebar-title">
                    {move || window.with(|w| w.as_ref().map(|w| w.title.clone()).unwrap_or_default())}
                </span>
                <div class="window-controls">
                    <button
                        aria-label="Minimize window"
                        on:pointerdown=stop_pointer
                        on:click=move |_| {
                            runtime.dispatch_action(DesktopAction::MinimizeWindow { window_id })
                        }
                    >
                        "_"
                    </button>
                    <button
                        aria-label="Close window"
                        on:pointerdown=stop_pointer
                        on:click=move |_| {
                            runtime.dispatch_action(DesktopAction::CloseWindow { window_id })
                        }
                    >
                        "×"
                    </button>
                </div>
            </header>
            <div class="window-content" id=container_id tabindex="0" on:keydown=forward_key></div>
        </section>
    }
}
