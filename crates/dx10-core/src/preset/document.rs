//! Preset document: capture, write, read, validate and apply

use std::fs;
use std::path::{Path, PathBuf};

use super::{PresetError, PRESET_EXTENSION};
use crate::params::{ParameterStore, STATE_TAG};
use crate::state::{ValueTree, XmlError};

/// Version stamped into every saved preset
pub const PLUGIN_VERSION: &str = "1.0";

const PRESET_NAME_ATTR: &str = "presetName";
const PLUGIN_VERSION_ATTR: &str = "pluginVersion";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Full parameter state plus the metadata stored alongside it.
///
/// The metadata lives as attributes on the root element on disk, but is kept
/// apart from `state` in memory so that reading a written document gives back
/// exactly the tree that was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDocument {
    state: ValueTree,
    preset_name: Option<String>,
    plugin_version: Option<String>,
}

impl PresetDocument {
    /// Wrap a state snapshot for saving under `preset_name`
    pub fn from_state(state: ValueTree, preset_name: impl Into<String>) -> Self {
        Self {
            state,
            preset_name: Some(preset_name.into()),
            plugin_version: Some(PLUGIN_VERSION.to_string()),
        }
    }

    /// Snapshot the store's current state
    pub fn capture<S: ParameterStore + ?Sized>(store: &S, preset_name: impl Into<String>) -> Self {
        Self::from_state(store.copy_state(), preset_name)
    }

    pub fn state(&self) -> &ValueTree {
        &self.state
    }

    pub fn preset_name(&self) -> Option<&str> {
        self.preset_name.as_deref()
    }

    /// Version found in (or written to) the file. Not validated.
    pub fn plugin_version(&self) -> Option<&str> {
        self.plugin_version.as_deref()
    }

    /// XML text of the document, declaration included
    pub fn to_xml(&self) -> std::io::Result<String> {
        let mut root = self.state.clone();
        if let Some(name) = &self.preset_name {
            root.set_attribute(PRESET_NAME_ATTR, name.as_str());
        }
        if let Some(version) = &self.plugin_version {
            root.set_attribute(PLUGIN_VERSION_ATTR, version.as_str());
        }
        Ok(format!("{}{}\n", XML_DECLARATION, root.to_xml()?))
    }

    /// Write to `path`, creating parent directories.
    ///
    /// The file is written in place; a failure part-way may leave a partial file.
    pub fn write(&self, path: &Path) -> Result<(), PresetError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PresetError::io(parent, e))?;
            }
        }

        let xml = self.to_xml().map_err(|e| PresetError::io(path, e))?;
        fs::write(path, xml).map_err(|e| PresetError::io(path, e))?;

        log::info!("[PRESETS] Wrote preset {:?}", path);
        Ok(())
    }

    /// Parse document text, requiring `schema_tag` as the root element.
    /// `path` is only used for error reporting.
    pub fn parse(xml: &str, schema_tag: &str, path: &Path) -> Result<Self, PresetError> {
        let mut state = ValueTree::from_xml(xml).map_err(|e: XmlError| PresetError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !state.has_tag(schema_tag) {
            return Err(PresetError::SchemaMismatch {
                path: path.to_path_buf(),
                found: state.tag().to_string(),
                expected: schema_tag.to_string(),
            });
        }

        let preset_name = state.remove_attribute(PRESET_NAME_ATTR);
        let plugin_version = state.remove_attribute(PLUGIN_VERSION_ATTR);

        Ok(Self {
            state,
            preset_name,
            plugin_version,
        })
    }

    /// Read and validate the preset at `path`.
    pub fn read(path: &Path, schema_tag: &str) -> Result<Self, PresetError> {
        if !path.is_file() {
            return Err(PresetError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let bytes = fs::read(path).map_err(|e| PresetError::io(path, e))?;
        let xml = String::from_utf8(bytes).map_err(|e| PresetError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::parse(&xml, schema_tag, path)
    }

    /// Replace the store's entire state with this document's state
    pub fn apply<S: ParameterStore + ?Sized>(self, store: &mut S) {
        store.replace_state(self.state);
    }
}

/// `true` if `path` ends in `.dx10`, in any letter case
pub fn has_preset_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PRESET_EXTENSION))
}

/// `path` with its extension replaced by a lower-case `.dx10`
pub fn with_preset_extension(path: &Path) -> PathBuf {
    path.with_extension(PRESET_EXTENSION)
}

/// Location of the preset called `name` directly inside `dir`
pub fn preset_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, PRESET_EXTENSION))
}

/// Side-effect-free check used to filter dropped files: extension, existence,
/// well-formedness and a `Parameters` root.
pub fn is_valid_preset_file(path: &Path) -> bool {
    has_preset_extension(path) && PresetDocument::read(path, STATE_TAG).is_ok()
}
