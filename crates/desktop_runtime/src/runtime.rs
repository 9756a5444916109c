//! Composition root owning every piece of desktop state.
//!
//! [`DesktopRuntime`] wires the window store, running-apps registry, settings store, and
//! interaction controller to injected [`HostServices`]. All commands from the presentation layer
//! go through it so that cross-store bookkeeping (registry entries, in-flight gestures) stays
//! consistent with the window store.

use std::{cell::Cell, rc::Rc};

use platform_host::{HostServices, RecordStore, ViewportProvider, ViewportSize};

use crate::{
    focus_cycle::{self, CycleDirection},
    interaction::{DraftUpdate, InteractionController},
    model::{
        AppId, DesktopSettings, PointerSample, ResizeEdge, SettingsPatch, Theme, WindowBounds,
        WindowId, WindowPatch,
    },
    persistence::{self, install_settings_persistence, install_window_store_persistence},
    running_apps::RunningApps,
    settings::SettingsStore,
    subscription::Subscription,
    window_manager::TASKBAR_HEIGHT_PX,
    window_store::{HydratedLayout, WindowStore, WindowStoreEvent},
};

/// Viewport minus the space the taskbar reserves.
struct WorkAreaViewport {
    host: Rc<dyn ViewportProvider>,
    taskbar_inset: Rc<Cell<i32>>,
}

impl ViewportProvider for WorkAreaViewport {
    fn viewport(&self) -> ViewportSize {
        let viewport = self.host.viewport();
        ViewportSize::new(
            viewport.width,
            (viewport.height - self.taskbar_inset.get()).max(0),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Records read at boot, before they are applied to the runtime.
pub struct BootState {
    pub layout: Option<HydratedLayout>,
    pub settings: Option<DesktopSettings>,
}

impl BootState {
    /// Reads both persisted records. Unreadable records come back as `None`.
    pub async fn load(records: &dyn RecordStore) -> Self {
        Self {
            layout: persistence::load_window_layout(records).await,
            settings: persistence::load_settings(records).await,
        }
    }
}

/// What a taskbar button click did to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarActivation {
    Restored,
    Minimized,
    Focused,
    Ignored,
}

pub struct DesktopRuntime {
    host: HostServices,
    windows: WindowStore,
    running_apps: RunningApps,
    settings: SettingsStore,
    interaction: InteractionController,
    booted: bool,
    _taskbar_inset_sync: Subscription,
    persistence: Vec<Subscription>,
}

impl DesktopRuntime {
    pub fn new(host: HostServices) -> Self {
        let settings = SettingsStore::default();
        let taskbar_inset = Rc::new(Cell::new(
            settings.settings().taskbar_inset(TASKBAR_HEIGHT_PX),
        ));
        let taskbar_inset_sync = {
            let taskbar_inset = Rc::clone(&taskbar_inset);
            settings.subscribe(move |settings| {
                taskbar_inset.set(settings.taskbar_inset(TASKBAR_HEIGHT_PX));
            })
        };
        let work_area: Rc<dyn ViewportProvider> = Rc::new(WorkAreaViewport {
            host: Rc::clone(&host.viewport),
            taskbar_inset,
        });

        Self {
            windows: WindowStore::new(work_area),
            running_apps: RunningApps::default(),
            settings,
            interaction: InteractionController::new(Rc::clone(&host.frames)),
            host,
            booted: false,
            _taskbar_inset_sync: taskbar_inset_sync,
            persistence: Vec::new(),
        }
    }

    /// Loads persisted records and applies them.
    pub async fn boot(&mut self) {
        let records = Rc::clone(&self.host.records);
        let state = BootState::load(records.as_ref()).await;
        self.apply_boot_state(state);
    }

    /// Applies boot records and starts persisting changes.
    ///
    /// Writes begin only after hydration so that early commands never overwrite a layout that
    /// has not been read yet. Calling this twice is a no-op.
    pub fn apply_boot_state(&mut self, state: BootState) {
        if self.booted {
            return;
        }
        self.booted = true;

        if let Some(settings) = state.settings {
            self.settings.load_settings(settings);
        }
        if let Some(layout) = state.layout {
            self.interaction.release_all();
            self.running_apps.clear();
            self.windows.hydrate(layout);
            self.running_apps.adopt_windows(&self.windows);
        }

        let records = Rc::clone(&self.host.records);
        self.persistence.push(install_window_store_persistence(
            &self.windows,
            Rc::clone(&records),
        ));
        self.persistence
            .push(install_settings_persistence(&self.settings, records));
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn host(&self) -> &HostServices {
        &self.host
    }

    pub fn windows(&self) -> &WindowStore {
        &self.windows
    }

    pub fn running_apps(&self) -> &RunningApps {
        &self.running_apps
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn subscribe_windows(
        &self,
        listener: impl Fn(&WindowStore, &WindowStoreEvent) + 'static,
    ) -> Subscription {
        self.windows.subscribe(listener)
    }

    pub fn subscribe_settings(
        &self,
        listener: impl Fn(&DesktopSettings) + 'static,
    ) -> Subscription {
        self.settings.subscribe(listener)
    }

    pub fn subscribe_drafts(&self, listener: impl Fn(&[DraftUpdate]) + 'static) -> Subscription {
        self.interaction.subscribe_drafts(listener)
    }

    pub fn launch_app(&mut self, app_id: AppId) -> Option<WindowId> {
        self.running_apps.launch_app(&mut self.windows, app_id)
    }

    pub fn close_app(&mut self, app_id: AppId) -> usize {
        let window_ids: Vec<_> = self
            .running_apps
            .get_app_instances(app_id)
            .into_iter()
            .map(|app| app.window_id.clone())
            .collect();
        for window_id in &window_ids {
            self.interaction.release_window(window_id);
        }
        self.running_apps.close_app(&mut self.windows, app_id)
    }

    pub fn close_app_instance(&mut self, window_id: &WindowId) -> bool {
        self.interaction.release_window(window_id);
        self.running_apps
            .close_app_instance(&mut self.windows, window_id)
    }

    /// Starts the soft close. The caller finishes it with [`DesktopRuntime::finish_close`] once
    /// the close animation has run.
    pub fn request_close(&mut self, window_id: &WindowId) -> bool {
        self.interaction.release_window(window_id);
        self.windows.request_close_window(window_id)
    }

    /// Removes a window after its close animation and drops its registry entry.
    pub fn finish_close(&mut self, window_id: &WindowId) -> bool {
        self.interaction.release_window(window_id);
        let removed = self.windows.remove_window(window_id);
        let forgotten = self.running_apps.forget_window(window_id);
        removed || forgotten
    }

    pub fn clear_all_windows(&mut self) {
        self.interaction.release_all();
        self.running_apps.clear();
        self.windows.clear_all_windows();
    }

    pub fn focus_window(&mut self, window_id: &WindowId) -> bool {
        self.windows.focus_window(window_id)
    }

    pub fn minimize_window(&mut self, window_id: &WindowId) -> bool {
        self.interaction.release_window(window_id);
        self.windows.minimize_window(window_id)
    }

    pub fn toggle_maximize(&mut self, window_id: &WindowId) -> bool {
        self.interaction.release_window(window_id);
        self.windows.maximize_window(window_id)
    }

    pub fn restore_window(&mut self, window_id: &WindowId) -> bool {
        self.windows.restore_window(window_id)
    }

    pub fn rename_window(&mut self, window_id: &WindowId, title: impl Into<String>) -> bool {
        self.windows
            .update_window(window_id, WindowPatch::title(title))
    }

    pub fn update_window(&mut self, window_id: &WindowId, patch: WindowPatch) -> bool {
        self.windows.update_window(window_id, patch)
    }

    /// Taskbar button behavior: restore a minimized window, minimize the focused one, otherwise
    /// bring it to front.
    pub fn activate_taskbar_window(&mut self, window_id: &WindowId) -> TaskbarActivation {
        let Some(window) = self.windows.get_window(window_id) else {
            return TaskbarActivation::Ignored;
        };
        if window.is_closing {
            return TaskbarActivation::Ignored;
        }
        if window.is_minimized {
            self.windows.restore_window(window_id);
            TaskbarActivation::Restored
        } else if window.is_focused {
            self.minimize_window(window_id);
            TaskbarActivation::Minimized
        } else {
            self.windows.focus_window(window_id);
            TaskbarActivation::Focused
        }
    }

    pub fn cycle_focus(&mut self, direction: CycleDirection) -> Option<WindowId> {
        focus_cycle::cycle_focus(&mut self.windows, direction)
    }

    pub fn begin_drag(&mut self, window_id: &WindowId, button: i16, pointer: PointerSample) -> bool {
        self.interaction
            .begin_drag(&mut self.windows, window_id, button, pointer)
    }

    pub fn begin_resize(
        &mut self,
        window_id: &WindowId,
        edge: ResizeEdge,
        button: i16,
        pointer: PointerSample,
    ) -> bool {
        self.interaction
            .begin_resize(&mut self.windows, window_id, edge, button, pointer)
    }

    pub fn pointer_move(&self, pointer: PointerSample) -> bool {
        self.interaction.pointer_move(pointer)
    }

    pub fn pointer_up(&mut self, pointer: PointerSample) -> Option<WindowId> {
        self.interaction.pointer_up(&mut self.windows, pointer)
    }

    /// Bounds to render for `window_id`, including any in-flight gesture draft.
    pub fn display_bounds(&self, window_id: &WindowId) -> Option<WindowBounds> {
        self.windows
            .get_window(window_id)
            .map(|window| self.interaction.display_bounds(window))
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) -> bool {
        self.settings.update_settings(patch)
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.settings.set_theme(theme)
    }

    pub fn reset_settings(&mut self) -> bool {
        self.settings.reset_settings()
    }
}
