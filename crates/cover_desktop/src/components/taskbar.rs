use super::*;
use crate::taskbar::DockEntry;

#[component]
pub(super) fn Taskbar() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let dock = create_memo(move |_| runtime.snapshot.with(|s| s.dock.clone()));

    view! {
        <nav class="taskbar" aria-label="Taskbar">
            <button
                class="taskbar-start"
                aria-label="Shut down"
                on:click=move |_| runtime.dispatch_action(DesktopAction::Deactivate)
            ></button>
            <div class="taskbar-apps" role="toolbar">
                <For
                    each=move || dock.get()
                    key=|entry| (entry.app_id.clone(), entry.indicator)
                    let:entry
                >
                    <DockButton entry=entry />
                </For>
            </div>
        </nav>
    }
}

#[component]
fn DockButton(entry: DockEntry) -> impl IntoView {
    let runtime = use_desktop_runtime();
    let class = match entry.indicator {
        Some(state) => format!("taskbar-app {}", state.css_class()),
        None => "taskbar-app".to_string(),
    };
    let app_id = entry.app_id.clone();

    view! {
        <button
            class=class
            title=entry.title.clone()
            aria-label=entry.title
            aria-pressed=entry.indicator.is_some().to_string()
            on:click=move |_| {
                runtime.dispatch_action(DesktopAction::ActivateIndicator {
                    app_id: app_id.clone(),
                })
            }
        >
            <span class="taskbar-app-icon" data-icon=entry.icon aria-hidden="true"></span>
        </button>
    }
}
