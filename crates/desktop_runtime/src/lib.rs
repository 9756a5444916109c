pub mod apps;
pub mod focus_cycle;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod running_apps;
pub mod runtime;
pub mod runtime_context;
pub mod settings;
mod subscription;
pub mod window_manager;
pub mod window_store;

pub use apps::{app_registry, get_app_by_id, launcher_apps, AppCategory, AppDescriptor};
pub use focus_cycle::{cycle_focus, CycleDirection, FocusCycleShortcut};
pub use interaction::{DraftUpdate, GestureKind, InteractionController, PRIMARY_POINTER_BUTTON};
pub use model::*;
pub use persistence::{PersistenceError, SETTINGS_STORE_RECORD, WINDOW_STORE_RECORD};
pub use running_apps::RunningApps;
pub use runtime::{BootState, DesktopRuntime, TaskbarActivation};
pub use runtime_context::{
    install_focus_cycle_shortcut, provide_desktop_runtime, use_desktop_runtime, DesktopProvider,
    DesktopRuntimeContext,
};
pub use settings::SettingsStore;
pub use subscription::Subscription;
pub use window_store::{HydratedLayout, WindowStore, WindowStoreEvent, WindowStoreSnapshot};
