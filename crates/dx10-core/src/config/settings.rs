//! Process-wide preset settings
//!
//! A tiny record holding the custom preset folder and the last preset that
//! was loaded. It is read once at startup and written in full after every
//! change. Persistence is best-effort: losing the settings must never stop
//! the user from saving or loading presets.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::io::{load_config, save_config};

/// Root element of the settings file
pub const SETTINGS_ROOT_TAG: &str = "DX10Settings";

/// Persisted preset settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// User-chosen preset folder (`None` = use the default folder)
    #[serde(
        rename = "@customPresetDirectory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_preset_directory: Option<PathBuf>,
    /// Absolute path of the most recently loaded preset file
    #[serde(
        rename = "@lastLoadedPresetPath",
        alias = "@lastLoadedPreset",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_loaded_preset: Option<PathBuf>,
}

impl Settings {
    /// Drop empty paths, which older files write instead of omitting the attribute
    fn normalized(mut self) -> Self {
        if is_empty_path(&self.custom_preset_directory) {
            self.custom_preset_directory = None;
        }
        if is_empty_path(&self.last_loaded_preset) {
            self.last_loaded_preset = None;
        }
        self
    }
}

fn is_empty_path(path: &Option<PathBuf>) -> bool {
    path.as_ref().is_some_and(|p| p.as_os_str().is_empty())
}

/// Owns the settings record and its file location
#[derive(Debug, Clone)]
pub struct SettingsStore {
    /// Where the record lives on disk
    path: PathBuf,
    /// Folder used when no valid custom folder is set
    default_directory: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Read settings from `path`, falling back to defaults on any problem.
    pub fn load(path: PathBuf, default_directory: PathBuf) -> Self {
        let settings = load_config::<Settings>(&path, SETTINGS_ROOT_TAG).normalized();
        Self {
            path,
            default_directory,
            settings,
        }
    }

    /// Write the full record. Failures are logged and otherwise ignored.
    pub fn save(&self) {
        let mut record = self.settings.clone();
        // A custom folder that vanished is not worth remembering
        if !record
            .custom_preset_directory
            .as_deref()
            .is_some_and(Path::is_dir)
        {
            record.custom_preset_directory = None;
        }

        if let Err(e) = save_config(&record, &self.path, SETTINGS_ROOT_TAG) {
            log::warn!("[SETTINGS] Could not persist settings: {:#}", e);
        }
    }

    /// Current record
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Location of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_directory(&self) -> &Path {
        &self.default_directory
    }

    /// The folder presets are scanned from and saved to.
    ///
    /// Returns the custom folder if it currently exists, otherwise the
    /// default folder (created if absent).
    pub fn effective_directory(&self) -> PathBuf {
        if let Some(custom) = self.settings.custom_preset_directory.as_deref() {
            if custom.is_dir() {
                return custom.to_path_buf();
            }
            log::info!(
                "[SETTINGS] Custom preset folder {:?} is missing, using default",
                custom
            );
        }
        ensure_directory(&self.default_directory);
        self.default_directory.clone()
    }

    /// Use `dir` as the preset folder. Returns `false` (and changes nothing)
    /// if `dir` is not an existing directory.
    pub fn set_custom_directory(&mut self, dir: &Path) -> bool {
        if !dir.is_dir() {
            log::warn!("[SETTINGS] Rejected preset folder {:?}: not a directory", dir);
            return false;
        }
        self.settings.custom_preset_directory = Some(dir.to_path_buf());
        self.save();
        true
    }

    /// Forget the custom folder and return the (created) default folder.
    pub fn reset_to_default(&mut self) -> PathBuf {
        self.settings.custom_preset_directory = None;
        ensure_directory(&self.default_directory);
        self.save();
        self.default_directory.clone()
    }

    pub fn last_loaded_preset(&self) -> Option<&Path> {
        self.settings.last_loaded_preset.as_deref()
    }

    /// Remember `path` as the last loaded preset and persist immediately.
    pub fn set_last_loaded(&mut self, path: &Path) {
        self.settings.last_loaded_preset = Some(path.to_path_buf());
        self.save();
    }
}

fn ensure_directory(dir: &Path) {
    if !dir.exists() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("[SETTINGS] Failed to create {:?}: {}", dir, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> SettingsStore {
        SettingsStore::load(
            dir.join("app").join("settings.xml"),
            dir.join("DX10 Presets"),
        )
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.xml");
        std::fs::write(&path, "<DX10Settings customPresetDirectory=").unwrap();

        let store = SettingsStore::load(path, dir.path().join("presets"));
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn test_effective_directory_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let effective = store.effective_directory();
        assert_eq!(effective, dir.path().join("DX10 Presets"));
        assert!(effective.is_dir());
    }

    #[test]
    fn test_custom_directory_persists() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("mine");
        std::fs::create_dir(&custom).unwrap();

        let mut store = store_in(dir.path());
        assert!(store.set_custom_directory(&custom));

        let reloaded = store_in(dir.path());
        assert_eq!(reloaded.effective_directory(), custom);
    }

    #[test]
    fn test_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        assert!(!store.set_custom_directory(&dir.path().join("nope")));
        assert!(store.settings().custom_preset_directory.is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_vanished_custom_directory_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("gone");
        std::fs::create_dir(&custom).unwrap();

        let mut store = store_in(dir.path());
        store.set_custom_directory(&custom);
        std::fs::remove_dir(&custom).unwrap();

        assert_eq!(store.effective_directory(), dir.path().join("DX10 Presets"));
    }

    #[test]
    fn test_reset_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("mine");
        std::fs::create_dir(&custom).unwrap();

        let mut store = store_in(dir.path());
        store.set_custom_directory(&custom);
        let default = store.reset_to_default();

        assert_eq!(default, dir.path().join("DX10 Presets"));
        assert!(store_in(dir.path()).settings().custom_preset_directory.is_none());
    }

    #[test]
    fn test_last_loaded_written_on_every_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(dir.path());
        let preset = dir.path().join("bass.dx10");

        store.set_last_loaded(&preset);

        let text = std::fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("<DX10Settings"));
        assert!(text.contains("lastLoadedPresetPath="));
        assert!(!text.contains("customPresetDirectory"));
        assert_eq!(store_in(dir.path()).last_loaded_preset(), Some(preset.as_path()));
    }

    #[test]
    fn test_reads_legacy_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.xml");
        std::fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<DX10Settings lastLoadedPreset="/tmp/old.dx10" customPresetDirectory=""/>"#,
        )
        .unwrap();

        let store = SettingsStore::load(path, dir.path().join("presets"));
        assert_eq!(
            store.last_loaded_preset(),
            Some(Path::new("/tmp/old.dx10"))
        );
        assert!(store.settings().custom_preset_directory.is_none());
    }
}
