//! Persisted configuration for the preset subsystem
//!
//! This module provides:
//!
//! - Generic XML config loading/saving
//! - Default preset and settings locations
//! - The `Settings` record and its best-effort store
//!
//! # Usage
//!
//! ```ignore
//! use dx10_core::config::{SettingsStore, default_preset_directory, default_settings_path};
//!
//! let mut settings = SettingsStore::load(default_settings_path(), default_preset_directory());
//! let root = settings.effective_directory();
//! ```

mod io;
mod paths;
mod settings;

pub use io::{load_config, save_config};
pub use paths::{default_preset_directory, default_settings_path};
pub use settings::{Settings, SettingsStore, SETTINGS_ROOT_TAG};
