//! Application settings for Blockpad.
//!
//! Settings live in the same store as the workspace, under their own key;
//! see [`WorkspaceStore::load_settings`](super::persistence::WorkspaceStore::load_settings).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub sidebar_collapsed: bool,
    /// Save the workspace after every change.
    pub auto_save: bool,
    /// Dispatch editor keyboard shortcuts.
    pub keyboard_shortcuts: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            sidebar_collapsed: false,
            auto_save: true,
            keyboard_shortcuts: true,
        }
    }
}

/// Returns the path of the Blockpad database.
///
/// - macOS / Linux: `~/.config/blockpad/blockpad.db`
/// - Windows: `%APPDATA%/Blockpad/blockpad.db`
pub fn default_storage_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("Blockpad").join("blockpad.db")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("blockpad").join("blockpad.db")
    }
}
