use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use platform_host::ViewportSize;

/// Length of the random suffix appended to generated window ids.
const WINDOW_ID_SUFFIX_LEN: usize = 9;

/// Opaque, unique window identifier.
///
/// Generated ids look like `terminal-1718000000000-3f9a0c1b2`, but callers must treat them as
/// opaque tokens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

impl WindowId {
    /// Generates a fresh id for a window of `app_id` created at `created_at` (unix ms).
    pub fn generate(app_id: AppId, created_at: u64) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}-{}",
            app_id.as_str(),
            created_at,
            &suffix[..WINDOW_ID_SUFFIX_LEN]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppId {
    #[serde(rename = "file-manager")]
    FileManager,
    #[serde(rename = "settings")]
    Settings,
    #[serde(rename = "terminal")]
    Terminal,
    #[serde(rename = "browser")]
    Browser,
    #[serde(rename = "text-editor")]
    TextEditor,
    #[serde(rename = "youtube")]
    YouTube,
}

impl AppId {
    pub const ALL: [AppId; 6] = [
        Self::FileManager,
        Self::Settings,
        Self::Terminal,
        Self::Browser,
        Self::TextEditor,
        Self::YouTube,
    ];

    /// Stable token used in window ids and persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileManager => "file-manager",
            Self::Settings => "settings",
            Self::Terminal => "terminal",
            Self::Browser => "browser",
            Self::TextEditor => "text-editor",
            Self::YouTube => "youtube",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|app_id| app_id.as_str() == token)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowBounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Raises width/height to the given minimums. Position is left untouched.
    pub fn clamped_min(self, min_width: i32, min_height: i32) -> Self {
        Self {
            width: self.width.max(min_width),
            height: self.height.max(min_height),
            ..self
        }
    }
}

/// Where a window sits and, when maximized, where it returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPlacement {
    Normal(WindowBounds),
    Maximized {
        bounds: WindowBounds,
        restore_bounds: WindowBounds,
    },
}

impl WindowPlacement {
    /// Bounds the window currently occupies.
    pub fn bounds(&self) -> WindowBounds {
        match *self {
            Self::Normal(bounds) | Self::Maximized { bounds, .. } => bounds,
        }
    }

    pub fn restore_bounds(&self) -> Option<WindowBounds> {
        match *self {
            Self::Normal(_) => None,
            Self::Maximized { restore_bounds, .. } => Some(restore_bounds),
        }
    }

    pub fn is_maximized(&self) -> bool {
        matches!(self, Self::Maximized { .. })
    }

    pub(crate) fn bounds_mut(&mut self) -> &mut WindowBounds {
        match self {
            Self::Normal(bounds) | Self::Maximized { bounds, .. } => bounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowMetadata {
    pub id: WindowId,
    pub app_id: AppId,
    pub title: String,
    pub placement: WindowPlacement,
    pub is_minimized: bool,
    pub is_closing: bool,
    pub is_focused: bool,
    pub z_index: u64,
    pub created_at: u64,
}

impl WindowMetadata {
    pub fn bounds(&self) -> WindowBounds {
        self.placement.bounds()
    }

    pub fn restore_bounds(&self) -> Option<WindowBounds> {
        self.placement.restore_bounds()
    }

    pub fn is_maximized(&self) -> bool {
        self.placement.is_maximized()
    }

    /// Whether the window may receive focus (neither minimized nor closing).
    pub fn is_focusable(&self) -> bool {
        !self.is_minimized && !self.is_closing
    }
}

/// Partial update merged into a window by [`crate::window_store::WindowStore::update_window`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowPatch {
    pub title: Option<String>,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl WindowPatch {
    /// Patch replacing all four bounds fields.
    pub fn bounds(bounds: WindowBounds) -> Self {
        Self {
            x: Some(bounds.x),
            y: Some(bounds.y),
            width: Some(bounds.width),
            height: Some(bounds.height),
            ..Self::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn apply_to_bounds(&self, bounds: WindowBounds) -> WindowBounds {
        WindowBounds {
            x: self.x.unwrap_or(bounds.x),
            y: self.y.unwrap_or(bounds.y),
            width: self.width.unwrap_or(bounds.width),
            height: self.height.unwrap_or(bounds.height),
        }
    }
}

/// Registry entry tying a launched application instance to its window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningApp {
    pub app_id: AppId,
    pub window_id: WindowId,
    pub is_running: bool,
    pub started_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskbarPosition {
    #[default]
    Bottom,
    Top,
}

/// User preferences persisted independently of the window layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesktopSettings {
    pub theme: Theme,
    pub wallpaper: String,
    pub icon_size: u32,
    pub show_clock: bool,
    pub show_system_tray: bool,
    pub taskbar_position: TaskbarPosition,
    pub auto_hide_taskbar: bool,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            wallpaper: String::new(),
            icon_size: 64,
            show_clock: true,
            show_system_tray: true,
            taskbar_position: TaskbarPosition::Bottom,
            auto_hide_taskbar: false,
        }
    }
}

impl DesktopSettings {
    /// The theme to paint: [`Theme::System`] follows the host color-scheme preference.
    pub fn resolved_theme(&self, prefers_dark: bool) -> Theme {
        match self.theme {
            Theme::System if prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            theme => theme,
        }
    }

    /// Vertical space the taskbar permanently reserves, or zero when it auto-hides.
    pub fn taskbar_inset(&self, taskbar_height: i32) -> i32 {
        if self.auto_hide_taskbar {
            0
        } else {
            taskbar_height
        }
    }
}

/// Partial update merged into [`DesktopSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub wallpaper: Option<String>,
    pub icon_size: Option<u32>,
    pub show_clock: Option<bool>,
    pub show_system_tray: Option<bool>,
    pub taskbar_position: Option<TaskbarPosition>,
    pub auto_hide_taskbar: Option<bool>,
}

impl SettingsPatch {
    pub(crate) fn apply(self, settings: &DesktopSettings) -> DesktopSettings {
        DesktopSettings {
            theme: self.theme.unwrap_or(settings.theme),
            wallpaper: self.wallpaper.unwrap_or_else(|| settings.wallpaper.clone()),
            icon_size: self.icon_size.unwrap_or(settings.icon_size),
            show_clock: self.show_clock.unwrap_or(settings.show_clock),
            show_system_tray: self.show_system_tray.unwrap_or(settings.show_system_tray),
            taskbar_position: self.taskbar_position.unwrap_or(settings.taskbar_position),
            auto_hide_taskbar: self.auto_hide_taskbar.unwrap_or(settings.auto_hide_taskbar),
        }
    }
}

/// Resize handle grabbed by the pointer, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeEdge {
    #[serde(rename = "n")]
    North,
    #[serde(rename = "s")]
    South,
    #[serde(rename = "e")]
    East,
    #[serde(rename = "w")]
    West,
    #[serde(rename = "ne")]
    NorthEast,
    #[serde(rename = "nw")]
    NorthWest,
    #[serde(rename = "se")]
    SouthEast,
    #[serde(rename = "sw")]
    SouthWest,
}

impl ResizeEdge {
    pub const ALL: [ResizeEdge; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    pub fn moves_north(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn moves_west(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

/// One pointer event reduced to what the interaction controller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerSample {
    pub pointer_id: i32,
    pub position: PointerPosition,
}

impl PointerSample {
    pub const fn new(pointer_id: i32, x: i32, y: i32) -> Self {
        Self {
            pointer_id,
            position: PointerPosition { x, y },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn generated_window_ids_embed_app_and_time_and_are_unique() {
        let a = WindowId::generate(AppId::TextEditor, 1_700_000_000_000);
        let b = WindowId::generate(AppId::TextEditor, 1_700_000_000_000);

        assert!(a.as_str().starts_with("text-editor-1700000000000-"));
        assert_eq!(a.as_str().len(), "text-editor-1700000000000-".len() + 9);
        assert_ne!(a, b);
    }

    #[test]
    fn app_id_tokens_round_trip() {
        for app_id in AppId::ALL {
            assert_eq!(AppId::parse(app_id.as_str()), Some(app_id));
            let json = serde_json::to_string(&app_id).expect("serialize");
            assert_eq!(json, format!("\"{}\"", app_id.as_str()));
        }
        assert_eq!(AppId::parse("paint"), None);
    }

    #[test]
    fn placement_exposes_restore_bounds_only_when_maximized() {
        let normal = WindowPlacement::Normal(WindowBounds::new(10, 20, 800, 600));
        assert_eq!(normal.restore_bounds(), None);
        assert!(!normal.is_maximized());

        let maximized = WindowPlacement::Maximized {
            bounds: WindowBounds::new(0, 0, 1200, 800),
            restore_bounds: WindowBounds::new(10, 20, 800, 600),
        };
        assert_eq!(maximized.bounds(), WindowBounds::new(0, 0, 1200, 800));
        assert_eq!(
            maximized.restore_bounds(),
            Some(WindowBounds::new(10, 20, 800, 600))
        );
    }

    #[test]
    fn window_patch_merges_only_present_fields() {
        let patch = WindowPatch {
            x: Some(5),
            height: Some(480),
            ..WindowPatch::default()
        };
        assert_eq!(
            patch.apply_to_bounds(WindowBounds::new(1, 2, 3, 4)),
            WindowBounds::new(5, 2, 3, 480)
        );
        assert!(WindowPatch::default().is_empty());
        assert!(!WindowPatch::title("x").is_empty());
    }

    #[test]
    fn settings_deserialize_partial_records_with_defaults() {
        let settings: DesktopSettings =
            serde_json::from_str(r#"{"theme":"dark","iconSize":96}"#).expect("deserialize");
        assert_eq!(
            settings,
            DesktopSettings {
                theme: Theme::Dark,
                icon_size: 96,
                ..DesktopSettings::default()
            }
        );
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(DesktopSettings::default()).expect("serialize");
        assert_eq!(json["taskbarPosition"], "bottom");
        assert_eq!(json["showSystemTray"], true);
        assert_eq!(json["theme"], "system");
    }

    #[test]
    fn taskbar_inset_is_zero_when_auto_hidden() {
        let mut settings = DesktopSettings::default();
        assert_eq!(settings.taskbar_inset(48), 48);
        settings.auto_hide_taskbar = true;
        assert_eq!(settings.taskbar_inset(48), 0);
    }
}
