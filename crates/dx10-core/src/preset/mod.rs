//! Preset files
//!
//! A preset is the complete parameter state written as XML, with the preset
//! name and the plugin version stamped onto the root element:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Parameters presetName="Soft Chimes" pluginVersion="1.0">
//!   <PARAM id="Attack" value="0.0"/>
//!   ...
//! </Parameters>
//! ```

mod document;
mod error;

pub use document::{
    has_preset_extension, is_valid_preset_file, preset_file, with_preset_extension,
    PresetDocument, PLUGIN_VERSION,
};
pub use error::PresetError;

/// File extension of preset files (matched case-insensitively, written lower-case)
pub const PRESET_EXTENSION: &str = "dx10";
