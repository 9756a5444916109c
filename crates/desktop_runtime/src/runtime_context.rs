//! Runtime provider and context wiring for the presentation layer.
//!
//! [`DesktopRuntimeContext`] owns the long-lived [`DesktopRuntime`] and mirrors its state into
//! signals: components read memoized selections and issue commands through
//! [`DesktopRuntimeContext::dispatch`]. Global keyboard handling and per-gesture pointer
//! listeners are installed here as well.
#![allow(clippy::clone_on_copy)]

use std::{collections::HashMap, time::Duration};

use leptos::{leptos_dom::helpers::WindowListenerHandle, *};
use platform_host::HostServices;

use crate::{
    focus_cycle::FocusCycleShortcut,
    model::{
        AppId, DesktopSettings, PointerSample, ResizeEdge, Theme, WindowBounds, WindowId,
        WindowMetadata,
    },
    runtime::{BootState, DesktopRuntime},
    window_manager::CLOSE_ANIMATION_MS,
    window_store::WindowStoreSnapshot,
};

#[derive(Clone, Copy)]
/// Leptos context for reading desktop state and dispatching commands.
pub struct DesktopRuntimeContext {
    /// Long-lived state owner. Mutate it only through [`DesktopRuntimeContext::dispatch`].
    pub runtime: StoredValue<DesktopRuntime>,
    /// Window store contents, refreshed after every store change.
    pub windows: RwSignal<WindowStoreSnapshot>,
    pub settings: RwSignal<DesktopSettings>,
    /// Visible drag/resize drafts, keyed by window.
    pub drafts: RwSignal<HashMap<WindowId, WindowBounds>>,
    /// Window ids bottom-to-top.
    pub window_ids_by_z: Memo<Vec<WindowId>>,
    pub focused_window_id: Memo<Option<WindowId>>,
    /// Non-closing windows in creation order, as the taskbar lists them.
    pub taskbar_windows: Memo<Vec<WindowMetadata>>,
    gesture_listeners: StoredValue<HashMap<i32, Vec<WindowListenerHandle>>>,
}

impl DesktopRuntimeContext {
    /// Runs `command` against the runtime.
    ///
    /// Signal updates raised while the command runs are batched, so effects observe the
    /// post-command state and may dispatch again.
    pub fn dispatch<R>(&self, command: impl FnOnce(&mut DesktopRuntime) -> R) -> Option<R> {
        let runtime = self.runtime;
        batch(move || runtime.try_update_value(command))
    }

    /// Reactive view of one window.
    pub fn window(&self, window_id: WindowId) -> Signal<Option<WindowMetadata>> {
        let windows = self.windows;
        Signal::derive(move || windows.with(|snapshot| snapshot.window(&window_id).cloned()))
    }

    /// Bounds to render for a window: its visible draft mid-gesture, else committed bounds.
    pub fn display_bounds(&self, window_id: WindowId) -> Signal<Option<WindowBounds>> {
        let windows = self.windows;
        let drafts = self.drafts;
        Signal::derive(move || {
            drafts
                .with(|drafts| drafts.get(&window_id).copied())
                .or_else(|| {
                    windows.with(|snapshot| snapshot.window(&window_id).map(|w| w.bounds()))
                })
        })
    }

    /// Theme to paint, with [`Theme::System`] resolved through the host color-scheme preference.
    pub fn resolved_theme(&self) -> Signal<Theme> {
        let settings = self.settings;
        Signal::derive(move || {
            settings.with(|settings| settings.resolved_theme(prefers_dark_color_scheme()))
        })
    }

    pub fn launch_app(&self, app_id: AppId) -> Option<WindowId> {
        self.dispatch(|runtime| runtime.launch_app(app_id)).flatten()
    }

    /// Starts a soft close and removes the window once the close animation has run.
    pub fn request_close(&self, window_id: WindowId) {
        let started = self
            .dispatch(|runtime| runtime.request_close(&window_id))
            .unwrap_or(false);
        if !started {
            return;
        }
        let ctx = self.clone();
        set_timeout(
            move || {
                ctx.dispatch(|runtime| runtime.finish_close(&window_id));
            },
            Duration::from_millis(CLOSE_ANIMATION_MS),
        );
    }

    pub fn activate_taskbar_window(&self, window_id: WindowId) {
        self.dispatch(|runtime| runtime.activate_taskbar_window(&window_id));
    }

    /// Starts dragging a window from a title-bar `pointerdown`.
    pub fn begin_drag(&self, window_id: WindowId, event: &web_sys::PointerEvent) {
        let pointer = pointer_sample(event);
        let started = self
            .dispatch(|runtime| runtime.begin_drag(&window_id, event.button(), pointer))
            .unwrap_or(false);
        if started {
            self.track_pointer(pointer.pointer_id);
        }
    }

    /// Starts resizing a window from a resize-handle `pointerdown`.
    pub fn begin_resize(&self, window_id: WindowId, edge: ResizeEdge, event: &web_sys::PointerEvent) {
        let pointer = pointer_sample(event);
        let started = self
            .dispatch(|runtime| runtime.begin_resize(&window_id, edge, event.button(), pointer))
            .unwrap_or(false);
        if started {
            self.track_pointer(pointer.pointer_id);
        }
    }

    /// Listens for moves and release of `pointer_id` until it is released.
    fn track_pointer(&self, pointer_id: i32) {
        let ctx = self.clone();
        let on_move = window_event_listener(ev::pointermove, move |event| {
            if event.pointer_id() != pointer_id {
                return;
            }
            let pointer = pointer_sample(&event);
            ctx.runtime.with_value(|runtime| runtime.pointer_move(pointer));
        });
        let on_up = window_event_listener(ev::pointerup, move |event| {
            if event.pointer_id() != pointer_id {
                return;
            }
            ctx.dispatch(|runtime| runtime.pointer_up(pointer_sample(&event)));
            ctx.release_pointer(pointer_id);
        });

        let replaced = self
            .gesture_listeners
            .try_update_value(|listeners| listeners.insert(pointer_id, vec![on_move, on_up]))
            .flatten();
        for handle in replaced.into_iter().flatten() {
            handle.remove();
        }
    }

    fn release_pointer(&self, pointer_id: i32) {
        let handles = self
            .gesture_listeners
            .try_update_value(|listeners| listeners.remove(&pointer_id))
            .flatten();
        for handle in handles.into_iter().flatten() {
            handle.remove();
        }
    }
}

fn pointer_sample(event: &web_sys::PointerEvent) -> PointerSample {
    PointerSample::new(event.pointer_id(), event.client_x(), event.client_y())
}

#[cfg(target_arch = "wasm32")]
fn prefers_dark_color_scheme() -> bool {
    window()
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn prefers_dark_color_scheme() -> bool {
    false
}

#[cfg(target_arch = "wasm32")]
fn apply_theme_class(theme: Theme) {
    let Some(root) = document().document_element() else {
        return;
    };
    if let Err(err) = root
        .class_list()
        .toggle_with_force("dark", theme == Theme::Dark)
    {
        logging::warn!("theme class update failed: {err:?}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn apply_theme_class(_theme: Theme) {}

/// Creates the runtime, mirrors it into signals, provides the context, and starts boot
/// hydration.
pub fn provide_desktop_runtime(host: HostServices) -> DesktopRuntimeContext {
    let records = host.records.clone();
    let runtime = DesktopRuntime::new(host);

    let windows = create_rw_signal(runtime.windows().snapshot());
    let settings = create_rw_signal(runtime.settings().settings().clone());
    let drafts = create_rw_signal(HashMap::<WindowId, WindowBounds>::new());

    runtime
        .subscribe_windows(move |store, _event| windows.set(store.snapshot()))
        .keep();
    runtime
        .subscribe_settings(move |next| settings.set(next.clone()))
        .keep();
    runtime
        .subscribe_drafts(move |updates| {
            drafts.update(|drafts| {
                for update in updates {
                    match update.bounds {
                        Some(bounds) => {
                            drafts.insert(update.window_id.clone(), bounds);
                        }
                        None => {
                            drafts.remove(&update.window_id);
                        }
                    }
                }
            });
        })
        .keep();

    let window_ids_by_z = create_memo(move |_| {
        windows.with(|snapshot| {
            snapshot
                .windows
                .iter()
                .map(|window| window.id.clone())
                .collect::<Vec<_>>()
        })
    });
    let focused_window_id =
        create_memo(move |_| windows.with(|snapshot| snapshot.focused_window_id.clone()));
    let taskbar_windows = create_memo(move |_| {
        windows.with(|snapshot| {
            let mut listed: Vec<_> = snapshot
                .windows
                .iter()
                .filter(|window| !window.is_closing)
                .cloned()
                .collect();
            listed.sort_by_key(|window| window.created_at);
            listed
        })
    });

    let ctx = DesktopRuntimeContext {
        runtime: store_value(runtime),
        windows,
        settings,
        drafts,
        window_ids_by_z,
        focused_window_id,
        taskbar_windows,
        gesture_listeners: store_value(HashMap::new()),
    };
    provide_context(ctx.clone());

    let theme = ctx.resolved_theme();
    create_effect(move |_| apply_theme_class(theme.get()));

    spawn_local(async move {
        let state = BootState::load(records.as_ref()).await;
        ctx.dispatch(|runtime| runtime.apply_boot_state(state));
    });

    ctx
}

/// Installs the global Alt+Tab / Alt+Shift+Tab focus-cycling shortcut.
pub fn install_focus_cycle_shortcut(ctx: DesktopRuntimeContext) -> WindowListenerHandle {
    window_event_listener(ev::keydown, move |event| {
        let Some(direction) =
            FocusCycleShortcut::from_key(&event.key(), event.alt_key(), event.shift_key())
        else {
            return;
        };
        event.prevent_default();
        ctx.dispatch(|runtime| runtime.cycle_focus(direction));
    })
}

#[component]
/// Provides [`DesktopRuntimeContext`] to descendant components and boots persisted state.
pub fn DesktopProvider(
    /// Injected browser or headless host bundle assembled by the entry layer.
    host_services: HostServices,
    children: Children,
) -> impl IntoView {
    let ctx = provide_desktop_runtime(host_services);
    let shortcut = install_focus_cycle_shortcut(ctx);
    on_cleanup(move || shortcut.remove());

    children().into_view()
}

/// Returns the current [`DesktopRuntimeContext`].
///
/// # Panics
///
/// Panics if called outside [`DesktopProvider`] or [`provide_desktop_runtime`].
pub fn use_desktop_runtime() -> DesktopRuntimeContext {
    use_context::<DesktopRuntimeContext>().expect("DesktopRuntimeContext not provided")
}
