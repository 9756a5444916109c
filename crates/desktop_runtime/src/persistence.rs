//! Persisted record layout for the window store and settings store, boot-time rehydration, and
//! best-effort writes.
//!
//! Records are written after every change and never awaited by callers. Failures are logged and
//! otherwise ignored; a record that cannot be read is treated as absent.

use std::{collections::BTreeMap, future::Future, rc::Rc};

use leptos::logging;
use platform_host::{load_record_with, save_record_with, RecordStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    model::{AppId, DesktopSettings, WindowBounds, WindowId, WindowMetadata, WindowPlacement},
    settings::SettingsStore,
    subscription::Subscription,
    window_manager::enforce_size_floor,
    window_store::{
        compact_z_indices, HydratedLayout, WindowStore, WindowStoreSnapshot, MAX_Z_INDEX,
    },
};

/// Record name of the persisted window layout.
pub const WINDOW_STORE_RECORD: &str = "window-store";
/// Record name of the persisted user settings.
pub const SETTINGS_STORE_RECORD: &str = "settings-store";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("record store `{record}` failed: {message}")]
    Storage { record: &'static str, message: String },
    #[error("record `{record}` is malformed: {source}")]
    Malformed {
        record: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One window as stored in the `window-store` record.
pub struct PersistedWindow {
    pub id: WindowId,
    pub app_id: AppId,
    #[serde(default)]
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub is_minimized: bool,
    #[serde(default)]
    pub is_maximized: bool,
    #[serde(default)]
    pub is_closing: bool,
    #[serde(default)]
    pub is_focused: bool,
    #[serde(default)]
    pub z_index: u64,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_bounds: Option<WindowBounds>,
}

impl From<&WindowMetadata> for PersistedWindow {
    fn from(window: &WindowMetadata) -> Self {
        let bounds = window.bounds();
        Self {
            id: window.id.clone(),
            app_id: window.app_id,
            title: window.title.clone(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            is_minimized: window.is_minimized,
            is_maximized: window.is_maximized(),
            is_closing: window.is_closing,
            is_focused: window.is_focused,
            z_index: window.z_index,
            created_at: window.created_at,
            restore_bounds: window.restore_bounds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// State payload of the `window-store` record.
pub struct PersistedWindowLayout {
    #[serde(default)]
    pub windows: BTreeMap<String, PersistedWindow>,
    #[serde(default)]
    pub next_z_index: u64,
}

impl From<&WindowStoreSnapshot> for PersistedWindowLayout {
    fn from(snapshot: &WindowStoreSnapshot) -> Self {
        Self {
            windows: snapshot
                .windows
                .iter()
                .map(|window| (window.id.0.clone(), PersistedWindow::from(window)))
                .collect(),
            next_z_index: snapshot.next_z_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// State payload of the `settings-store` record.
pub struct PersistedSettings {
    #[serde(default)]
    pub settings: DesktopSettings,
}

/// Decodes a `window-store` payload, dropping individual windows that do not parse.
pub fn decode_window_layout(state: Value) -> PersistedWindowLayout {
    let next_z_index = state
        .get("nextZIndex")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    let windows = match state {
        Value::Object(mut fields) => match fields.remove("windows") {
            Some(Value::Object(entries)) => entries
                .into_iter()
                .filter_map(|(key, raw)| match serde_json::from_value(raw) {
                    Ok(window) => Some((key, window)),
                    Err(err) => {
                        logging::warn!("dropping unreadable persisted window {key}: {err}");
                        None
                    }
                })
                .collect(),
            _ => BTreeMap::new(),
        },
        _ => BTreeMap::new(),
    };
    PersistedWindowLayout {
        windows,
        next_z_index,
    }
}

/// Turns a persisted layout into store-ready windows.
///
/// Closing flags are dropped, maximized windows without restore bounds are demoted, sizes are
/// floor-clamped, exactly one window is focused when any is focusable, and the z-index counter
/// lands above every restored window. Z-indices too large to keep growing are renumbered from 1
/// in stacking order.
pub fn normalize_layout(layout: PersistedWindowLayout) -> HydratedLayout {
    let mut windows: Vec<WindowMetadata> = layout
        .windows
        .into_iter()
        .map(|(key, persisted)| {
            let bounds = enforce_size_floor(WindowBounds::new(
                persisted.x,
                persisted.y,
                persisted.width,
                persisted.height,
            ));
            let placement = match persisted.restore_bounds {
                Some(restore_bounds) if persisted.is_maximized => WindowPlacement::Maximized {
                    bounds,
                    restore_bounds: enforce_size_floor(restore_bounds),
                },
                _ => WindowPlacement::Normal(bounds),
            };
            WindowMetadata {
                id: WindowId(key),
                app_id: persisted.app_id,
                title: persisted.title,
                placement,
                is_minimized: persisted.is_minimized,
                is_closing: false,
                is_focused: persisted.is_focused,
                z_index: persisted.z_index,
                created_at: persisted.created_at,
            }
        })
        .collect();
    windows.sort_by_key(|window| window.z_index);

    let focus_target = windows
        .iter()
        .filter(|window| window.is_focusable() && window.is_focused)
        .max_by_key(|window| window.z_index)
        .or_else(|| {
            windows
                .iter()
                .filter(|window| window.is_focusable())
                .max_by_key(|window| window.z_index)
        })
        .map(|window| window.id.clone());
    for window in &mut windows {
        window.is_focused = Some(&window.id) == focus_target.as_ref();
    }

    let max_z_index = windows.iter().map(|window| window.z_index).max().unwrap_or(0);
    let next_z_index = match max_z_index.max(layout.next_z_index) {
        highest if highest >= MAX_Z_INDEX => compact_z_indices(&mut windows),
        highest => highest + 1,
    };
    HydratedLayout {
        windows,
        next_z_index,
    }
}

/// Reads and normalizes the persisted window layout. Missing or unreadable records yield `None`.
pub async fn load_window_layout(records: &dyn RecordStore) -> Option<HydratedLayout> {
    match load_record_with::<_, Value>(records, WINDOW_STORE_RECORD).await {
        Ok(Some(envelope)) => Some(normalize_layout(decode_window_layout(envelope.state))),
        Ok(None) => None,
        Err(message) => {
            logging::warn!(
                "{}",
                PersistenceError::Storage {
                    record: WINDOW_STORE_RECORD,
                    message,
                }
            );
            None
        }
    }
}

/// Reads the persisted settings. Missing or unreadable records yield `None`.
pub async fn load_settings(records: &dyn RecordStore) -> Option<DesktopSettings> {
    match load_record_with::<_, Value>(records, SETTINGS_STORE_RECORD).await {
        Ok(Some(envelope)) => match serde_json::from_value::<PersistedSettings>(envelope.state) {
            Ok(persisted) => Some(persisted.settings),
            Err(source) => {
                logging::warn!(
                    "{}",
                    PersistenceError::Malformed {
                        record: SETTINGS_STORE_RECORD,
                        source,
                    }
                );
                None
            }
        },
        Ok(None) => None,
        Err(message) => {
            logging::warn!(
                "{}",
                PersistenceError::Storage {
                    record: SETTINGS_STORE_RECORD,
                    message,
                }
            );
            None
        }
    }
}

/// Writes the window layout.
///
/// # Errors
///
/// Returns [`PersistenceError::Storage`] when the record store rejects the write.
pub async fn save_window_layout(
    records: &dyn RecordStore,
    layout: &PersistedWindowLayout,
) -> Result<(), PersistenceError> {
    save_record_with(records, WINDOW_STORE_RECORD, layout)
        .await
        .map_err(|message| PersistenceError::Storage {
            record: WINDOW_STORE_RECORD,
            message,
        })
}

/// Writes the settings record.
///
/// # Errors
///
/// Returns [`PersistenceError::Storage`] when the record store rejects the write.
pub async fn save_settings(
    records: &dyn RecordStore,
    settings: &DesktopSettings,
) -> Result<(), PersistenceError> {
    let persisted = PersistedSettings {
        settings: settings.clone(),
    };
    save_record_with(records, SETTINGS_STORE_RECORD, &persisted)
        .await
        .map_err(|message| PersistenceError::Storage {
            record: SETTINGS_STORE_RECORD,
            message,
        })
}

/// Persists the window layout after every store change.
pub fn install_window_store_persistence(
    store: &WindowStore,
    records: Rc<dyn RecordStore>,
) -> Subscription {
    store.subscribe(move |store, _event| {
        let layout = PersistedWindowLayout::from(&store.snapshot());
        let records = Rc::clone(&records);
        spawn_persist(async move {
            if let Err(err) = save_window_layout(records.as_ref(), &layout).await {
                logging::warn!("{err}");
            }
        });
    })
}

/// Persists settings after every settings change.
pub fn install_settings_persistence(
    store: &SettingsStore,
    records: Rc<dyn RecordStore>,
) -> Subscription {
    store.subscribe(move |settings| {
        let settings = settings.clone();
        let records = Rc::clone(&records);
        spawn_persist(async move {
            if let Err(err) = save_settings(records.as_ref(), &settings).await {
                logging::warn!("{err}");
            }
        });
    })
}

#[cfg(target_arch = "wasm32")]
fn spawn_persist(task: impl Future<Output = ()> + 'static) {
    leptos::spawn_local(task);
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_persist(task: impl Future<Output = ()> + 'static) {
    futures::executor::block_on(task);
}
