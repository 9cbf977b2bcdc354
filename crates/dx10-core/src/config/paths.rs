//! Path utilities for DX10 presets and settings
//!
//! Provides the standard per-user locations used when no custom preset
//! folder has been chosen.

use std::path::PathBuf;

/// Get the default preset directory
///
/// Returns: `~/Documents/DX10 Presets`
pub fn default_preset_directory() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("DX10 Presets")
}

/// Get the settings file path
///
/// Returns: `{user data dir}/DX10/settings.xml`
pub fn default_settings_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("DX10")
        .join("settings.xml")
}
