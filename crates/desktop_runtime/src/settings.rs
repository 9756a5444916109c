//! User preference store, persisted independently of the window layout.

use std::rc::Rc;

use crate::{
    model::{DesktopSettings, SettingsPatch, TaskbarPosition, Theme},
    subscription::{Subscribers, Subscription},
};

type SettingsListener = dyn Fn(&DesktopSettings);

#[derive(Default)]
pub struct SettingsStore {
    settings: DesktopSettings,
    listeners: Subscribers<SettingsListener>,
}

impl SettingsStore {
    pub fn new(settings: DesktopSettings) -> Self {
        Self {
            settings,
            listeners: Subscribers::default(),
        }
    }

    /// Registers `listener` for settings changes until the returned handle is dropped.
    pub fn subscribe(&self, listener: impl Fn(&DesktopSettings) + 'static) -> Subscription {
        let listener: Rc<SettingsListener> = Rc::new(listener);
        self.listeners.add(listener)
    }

    /// Merges `patch` into the current settings. Returns `false` when nothing changed.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> bool {
        let next = patch.apply(&self.settings);
        self.replace(next)
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        self.update_settings(SettingsPatch {
            theme: Some(theme),
            ..SettingsPatch::default()
        })
    }

    pub fn reset_settings(&mut self) -> bool {
        self.replace(DesktopSettings::default())
    }

    /// Replaces the settings wholesale, as when restoring a persisted record.
    pub fn load_settings(&mut self, settings: DesktopSettings) -> bool {
        self.replace(settings)
    }

    pub fn settings(&self) -> &DesktopSettings {
        &self.settings
    }

    /// The stored theme preference, possibly [`Theme::System`].
    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    /// The theme to paint: [`Theme::System`] resolves through the host color-scheme preference.
    pub fn resolved_theme(&self, prefers_dark: bool) -> Theme {
        self.settings.resolved_theme(prefers_dark)
    }

    pub fn wallpaper(&self) -> &str {
        &self.settings.wallpaper
    }

    pub fn icon_size(&self) -> u32 {
        self.settings.icon_size
    }

    pub fn taskbar_position(&self) -> TaskbarPosition {
        self.settings.taskbar_position
    }

    fn replace(&mut self, next: DesktopSettings) -> bool {
        if next == self.settings {
            return false;
        }
        self.settings = next;
        for listener in self.listeners.listeners() {
            listener(&self.settings);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_first_run_preferences() {
        let store = SettingsStore::default();
        assert_eq!(store.theme(), Theme::System);
        assert_eq!(store.wallpaper(), "");
        assert_eq!(store.icon_size(), 64);
        assert!(store.settings().show_clock);
        assert!(store.settings().show_system_tray);
        assert_eq!(store.taskbar_position(), TaskbarPosition::Bottom);
        assert!(!store.settings().auto_hide_taskbar);
    }

    #[test]
    fn partial_update_leaves_other_fields_alone() {
        let mut store = SettingsStore::default();
        store.update_settings(SettingsPatch {
            icon_size: Some(48),
            wallpaper: Some("aurora.jpg".to_string()),
            ..SettingsPatch::default()
        });

        assert_eq!(
            store.settings(),
            &DesktopSettings {
                icon_size: 48,
                wallpaper: "aurora.jpg".to_string(),
                ..DesktopSettings::default()
            }
        );
    }

    #[test]
    fn reset_and_load_replace_everything() {
        let mut store = SettingsStore::default();
        store.set_theme(Theme::Dark);
        assert!(store.reset_settings());
        assert_eq!(store.settings(), &DesktopSettings::default());

        let loaded = DesktopSettings {
            taskbar_position: TaskbarPosition::Top,
            show_clock: false,
            ..DesktopSettings::default()
        };
        store.load_settings(loaded.clone());
        assert_eq!(store.settings(), &loaded);
    }

    #[test]
    fn system_theme_resolves_through_preference() {
        let mut store = SettingsStore::default();
        assert_eq!(store.resolved_theme(true), Theme::Dark);
        assert_eq!(store.resolved_theme(false), Theme::Light);

        store.set_theme(Theme::Light);
        assert_eq!(store.resolved_theme(true), Theme::Light);
    }

    #[test]
    fn listeners_fire_only_on_change() {
        let mut store = SettingsStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = store.subscribe(move |settings| sink.borrow_mut().push(settings.theme));

        store.set_theme(Theme::Dark);
        store.set_theme(Theme::Dark);
        store.reset_settings();

        assert_eq!(*seen.borrow(), vec![Theme::Dark, Theme::System]);
    }
}
