//! Registry of launched application instances, keyed by the window each one owns.
//!
//! Apps are launched only through [`RunningApps::launch_app`], which creates the window and the
//! registry entry together. Every entry refers to a window the [`WindowStore`] still holds.

use std::collections::BTreeMap;

use leptos::logging;

use crate::{
    apps::get_app_by_id,
    model::{AppId, RunningApp, WindowId},
    window_store::WindowStore,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunningApps {
    apps: BTreeMap<WindowId, RunningApp>,
}

impl RunningApps {
    /// Creates a window titled with the app's display name and records the instance.
    ///
    /// Apps without an executable descriptor are skipped with a warning.
    pub fn launch_app(&mut self, store: &mut WindowStore, app_id: AppId) -> Option<WindowId> {
        let Some(descriptor) = get_app_by_id(app_id).filter(|entry| entry.executable) else {
            logging::warn!("app {app_id} not found in registry");
            return None;
        };

        let window_id = store.create_window(app_id, descriptor.name);
        let started_at = store
            .get_window(&window_id)
            .map(|window| window.created_at)
            .unwrap_or_default();
        self.apps.insert(
            window_id.clone(),
            RunningApp {
                app_id,
                window_id: window_id.clone(),
                is_running: true,
                started_at,
            },
        );
        Some(window_id)
    }

    /// Hard-closes every instance of `app_id`. Returns how many windows were closed.
    pub fn close_app(&mut self, store: &mut WindowStore, app_id: AppId) -> usize {
        let window_ids: Vec<_> = self
            .apps
            .values()
            .filter(|app| app.app_id == app_id)
            .map(|app| app.window_id.clone())
            .collect();
        for window_id in &window_ids {
            store.close_window(window_id);
            self.apps.remove(window_id);
        }
        window_ids.len()
    }

    /// Hard-closes one instance.
    pub fn close_app_instance(&mut self, store: &mut WindowStore, window_id: &WindowId) -> bool {
        let closed = store.close_window(window_id);
        let forgotten = self.apps.remove(window_id).is_some();
        closed || forgotten
    }

    /// Drops the entry for a window the store has already removed.
    pub fn forget_window(&mut self, window_id: &WindowId) -> bool {
        self.apps.remove(window_id).is_some()
    }

    /// Registers windows restored from a persisted layout that have no entry yet.
    pub fn adopt_windows(&mut self, store: &WindowStore) -> usize {
        let mut adopted = 0;
        for window in store.windows_by_z_order() {
            if self.apps.contains_key(&window.id) {
                continue;
            }
            self.apps.insert(
                window.id.clone(),
                RunningApp {
                    app_id: window.app_id,
                    window_id: window.id.clone(),
                    is_running: true,
                    started_at: window.created_at,
                },
            );
            adopted += 1;
        }
        adopted
    }

    /// Drops entries whose windows are no longer in `store`.
    pub fn retain_known(&mut self, store: &WindowStore) {
        self.apps
            .retain(|window_id, _| store.get_window(window_id).is_some());
    }

    pub fn clear(&mut self) {
        self.apps.clear();
    }

    pub fn is_app_running(&self, app_id: AppId) -> bool {
        self.apps.values().any(|app| app.app_id == app_id)
    }

    pub fn get_running_app_count(&self) -> usize {
        self.apps.len()
    }

    /// All instances, earliest start first.
    pub fn get_running_apps(&self) -> Vec<&RunningApp> {
        let mut apps: Vec<_> = self.apps.values().collect();
        apps.sort_by_key(|app| app.started_at);
        apps
    }

    pub fn get_app_instances(&self, app_id: AppId) -> Vec<&RunningApp> {
        self.get_running_apps()
            .into_iter()
            .filter(|app| app.app_id == app_id)
            .collect()
    }

    pub fn get(&self, window_id: &WindowId) -> Option<&RunningApp> {
        self.apps.get(window_id)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use platform_host::{FixedViewport, ViewportSize};
    use pretty_assertions::assert_eq;

    use super::*;

    fn store() -> WindowStore {
        WindowStore::new(Rc::new(FixedViewport::new(ViewportSize::new(1280, 720))))
    }

    #[test]
    fn launch_creates_exactly_one_window_and_entry() {
        let mut store = store();
        let mut apps = RunningApps::default();

        let window_id = apps
            .launch_app(&mut store, AppId::TextEditor)
            .expect("launch");

        assert_eq!(store.window_count(), 1);
        assert_eq!(apps.get_running_app_count(), 1);
        let window = store.get_window(&window_id).expect("window");
        assert_eq!(window.title, "Text Editor");
        assert!(window.is_focused);
        let entry = apps.get(&window_id).expect("entry");
        assert_eq!(entry.app_id, AppId::TextEditor);
        assert!(entry.is_running);
    }

    #[test]
    fn launching_app_without_descriptor_is_a_no_op() {
        let mut store = store();
        let mut apps = RunningApps::default();

        assert_eq!(apps.launch_app(&mut store, AppId::YouTube), None);
        assert_eq!(store.window_count(), 0);
        assert_eq!(apps.get_running_app_count(), 0);
    }

    #[test]
    fn close_app_closes_every_instance() {
        let mut store = store();
        let mut apps = RunningApps::default();
        apps.launch_app(&mut store, AppId::Terminal);
        let browser = apps.launch_app(&mut store, AppId::Browser).expect("browser");
        apps.launch_app(&mut store, AppId::Terminal);

        assert_eq!(apps.close_app(&mut store, AppId::Terminal), 2);

        assert!(!apps.is_app_running(AppId::Terminal));
        assert!(apps.is_app_running(AppId::Browser));
        assert_eq!(store.window_count(), 1);
        assert!(store.get_window(&browser).is_some());
    }

    #[test]
    fn close_instance_removes_window_and_entry() {
        let mut store = store();
        let mut apps = RunningApps::default();
        let a = apps.launch_app(&mut store, AppId::Terminal).expect("a");
        let b = apps.launch_app(&mut store, AppId::Terminal).expect("b");

        assert!(apps.close_app_instance(&mut store, &a));
        assert!(!apps.close_app_instance(&mut store, &a));

        let instances: Vec<_> = apps
            .get_app_instances(AppId::Terminal)
            .into_iter()
            .map(|app| app.window_id.clone())
            .collect();
        assert_eq!(instances, vec![b]);
        assert_eq!(store.window_count(), 1);
    }

    #[test]
    fn running_apps_are_ordered_by_start() {
        let mut store = store();
        let mut apps = RunningApps::default();
        let first = apps.launch_app(&mut store, AppId::Settings).expect("first");
        let second = apps.launch_app(&mut store, AppId::FileManager).expect("second");

        let order: Vec<_> = apps
            .get_running_apps()
            .into_iter()
            .map(|app| app.window_id.clone())
            .collect();
        assert_eq!(order, vec![first, second]);
    }

    #[test]
    fn forget_and_retain_keep_registry_within_store() {
        let mut store = store();
        let mut apps = RunningApps::default();
        let a = apps.launch_app(&mut store, AppId::Terminal).expect("a");
        let b = apps.launch_app(&mut store, AppId::Browser).expect("b");

        store.remove_window(&a);
        assert!(apps.forget_window(&a));
        store.close_window(&b);
        apps.retain_known(&store);

        assert_eq!(apps.get_running_app_count(), 0);
    }

    #[test]
    fn adopt_registers_windows_missing_from_registry() {
        let mut store = store();
        let mut apps = RunningApps::default();
        apps.launch_app(&mut store, AppId::Terminal);
        let orphan = store.create_window(AppId::Browser, "Browser");

        assert_eq!(apps.adopt_windows(&store), 1);
        assert_eq!(apps.adopt_windows(&store), 0);
        assert_eq!(
            apps.get(&orphan).map(|app| app.app_id),
            Some(AppId::Browser)
        );
    }
}
