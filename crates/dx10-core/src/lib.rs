//! DX10 Core - Preset management for the DX10 FM synthesizer
//!
//! Turns the plugin's live parameter state into `.dx10` preset files, builds
//! the indented preset list shown in the editor's selector, and keeps the
//! selector id, the id→file map and the directory tree consistent while the
//! user browses, saves, loads and steps through presets.

pub mod config;
pub mod manager;
pub mod params;
pub mod pick;
pub mod preset;
pub mod scanner;
pub mod selection;
pub mod state;

pub use manager::{PresetManager, Selection};
pub use params::{MemoryParameterStore, ParameterStore, PRESET_INDEX_PARAM};
pub use pick::{PickHandle, PickKind, PickOutcome};
pub use preset::{PresetDocument, PresetError, PRESET_EXTENSION};
pub use scanner::{FolderProbe, PresetEntry, ScanOptions};
pub use state::ValueTree;
