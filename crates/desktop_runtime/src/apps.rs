use serde::{Deserialize, Serialize};

use crate::model::AppId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppCategory {
    Productivity,
    System,
    Utility,
    Entertainment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppDescriptor {
    pub app_id: AppId,
    /// Launcher label, also used as the initial window title.
    pub name: &'static str,
    pub icon: &'static str,
    pub category: AppCategory,
    pub executable: bool,
}

const APP_REGISTRY: [AppDescriptor; 5] = [
    AppDescriptor {
        app_id: AppId::FileManager,
        name: "File Manager",
        icon: "📁",
        category: AppCategory::Utility,
        executable: true,
    },
    AppDescriptor {
        app_id: AppId::Settings,
        name: "Settings",
        icon: "⚙️",
        category: AppCategory::System,
        executable: true,
    },
    AppDescriptor {
        app_id: AppId::Terminal,
        name: "Terminal",
        icon: "💻",
        category: AppCategory::Utility,
        executable: true,
    },
    AppDescriptor {
        app_id: AppId::Browser,
        name: "Browser",
        icon: "🌐",
        category: AppCategory::Productivity,
        executable: true,
    },
    AppDescriptor {
        app_id: AppId::TextEditor,
        name: "Text Editor",
        icon: "📝",
        category: AppCategory::Productivity,
        executable: true,
    },
];

pub fn app_registry() -> &'static [AppDescriptor] {
    &APP_REGISTRY
}

/// Looks up the descriptor for `app_id`. Apps without a descriptor cannot be launched.
pub fn get_app_by_id(app_id: AppId) -> Option<&'static AppDescriptor> {
    app_registry().iter().find(|entry| entry.app_id == app_id)
}

pub fn launcher_apps() -> Vec<AppDescriptor> {
    app_registry()
        .iter()
        .copied()
        .filter(|entry| entry.executable)
        .collect()
}

pub fn apps_in_category(category: AppCategory) -> Vec<AppDescriptor> {
    app_registry()
        .iter()
        .copied()
        .filter(|entry| entry.category == category)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn every_registered_app_resolves_by_id() {
        for descriptor in app_registry() {
            assert_eq!(get_app_by_id(descriptor.app_id), Some(descriptor));
        }
    }

    #[test]
    fn youtube_has_no_descriptor() {
        assert_eq!(get_app_by_id(AppId::YouTube), None);
    }

    #[test]
    fn launcher_lists_executable_apps_in_registry_order() {
        let names: Vec<_> = launcher_apps().iter().map(|entry| entry.name).collect();
        assert_eq!(
            names,
            vec!["File Manager", "Settings", "Terminal", "Browser", "Text Editor"]
        );
    }

    #[test]
    fn category_filter_groups_apps() {
        let utilities: Vec<_> = apps_in_category(AppCategory::Utility)
            .iter()
            .map(|entry| entry.app_id)
            .collect();
        assert_eq!(utilities, vec![AppId::FileManager, AppId::Terminal]);
        assert!(apps_in_category(AppCategory::Entertainment).is_empty());
    }
}
