use desktop_runtime::{use_desktop_runtime, DesktopProvider};
use leptos::*;
use leptos_meta::*;
use platform_host_web::build_host_services;

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Web Desktop" />
        <main class="site-root">
            <DesktopEntry />
        </main>
    }
}

#[component]
pub fn DesktopEntry() -> impl IntoView {
    view! {
        <DesktopProvider host_services=build_host_services()>
            <DesktopSurface />
        </DesktopProvider>
    }
}

/// Mount point for the window layer. Mini-app rendering happens in the presentation crates.
#[component]
fn DesktopSurface() -> impl IntoView {
    let runtime = use_desktop_runtime();
    let window_count = move || runtime.window_ids_by_z.with(|ids| ids.len().to_string());
    let focused = move || {
        runtime
            .focused_window_id
            .get()
            .map(|id| id.to_string())
            .unwrap_or_default()
    };

    view! {
        <div
            class="desktop-window-layer"
            data-window-count=window_count
            data-focused-window=focused
        ></div>
    }
}
